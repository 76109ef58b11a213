//! Caller-owned confetti instance bound to one surface

use crate::controller::{AnimationController, CompletionHook, Phase};
use crate::driver::TickSource;
use confetti_core::CanvasSize;
use confetti_particles::{ConfettiOptions, ParticleRng, PartialOptions, Salvo};
use confetti_render::Renderer;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where confetti is drawn. The size is read on every `fire`; `None` means
/// the surface is not available right now.
pub trait Surface {
    fn size(&self) -> Option<CanvasSize>;
}

impl Surface for CanvasSize {
    fn size(&self) -> Option<CanvasSize> {
        (!self.is_empty()).then_some(*self)
    }
}

impl<F: Fn() -> Option<CanvasSize>> Surface for F {
    fn size(&self) -> Option<CanvasSize> {
        self()
    }
}

/// Platform reduced-motion setting, queried on every `fire`
pub trait MotionPreference {
    fn prefers_reduced_motion(&self) -> bool;
}

impl MotionPreference for bool {
    fn prefers_reduced_motion(&self) -> bool {
        *self
    }
}

impl<F: Fn() -> bool> MotionPreference for F {
    fn prefers_reduced_motion(&self) -> bool {
        self()
    }
}

/// Instance-wide settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOptions {
    /// Skip every `fire` while the platform asks for reduced motion
    #[serde(alias = "disableForReducedMotion")]
    pub disable_for_reduced_motion: bool,
    /// Let a running session pick up the surface size of later `fire`
    /// calls. When off, a session keeps the size it started with.
    pub resize: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            disable_for_reduced_motion: false,
            resize: true,
        }
    }
}

/// Confetti bound to a surface, a renderer and a tick source.
///
/// ```ignore
/// let mut confetti = Confetti::create(CanvasSize::new(800.0, 600.0), recorder, ManualDriver::new(), CreateOptions::default());
/// confetti.fire(&PartialOptions::new().particle_count(150).spread(180.0));
/// ```
pub struct Confetti<T: TickSource> {
    controller: AnimationController<T>,
    surface: Box<dyn Surface>,
    motion: Box<dyn MotionPreference>,
    options: CreateOptions,
    session_canvas: Option<CanvasSize>,
}

impl<T: TickSource> Confetti<T> {
    pub fn create(
        surface: impl Surface + 'static,
        renderer: impl Renderer + 'static,
        driver: T,
        options: CreateOptions,
    ) -> Self {
        Self::from_controller(
            surface,
            AnimationController::new(Box::new(renderer), driver),
            options,
        )
    }

    /// Like `create`, with a seeded random source
    pub fn create_seeded(
        surface: impl Surface + 'static,
        renderer: impl Renderer + 'static,
        driver: T,
        options: CreateOptions,
        seed: u64,
    ) -> Self {
        Self::from_controller(
            surface,
            AnimationController::with_rng(Box::new(renderer), driver, ParticleRng::new(seed)),
            options,
        )
    }

    fn from_controller(
        surface: impl Surface + 'static,
        controller: AnimationController<T>,
        options: CreateOptions,
    ) -> Self {
        Self {
            controller,
            surface: Box::new(surface),
            motion: Box::new(false),
            options,
            session_canvas: None,
        }
    }

    /// Replace the reduced-motion source (defaults to "no preference")
    pub fn with_motion_preference(mut self, preference: impl MotionPreference + 'static) -> Self {
        self.motion = Box::new(preference);
        self
    }

    /// Fire a burst. Unset fields fall back to the defaults.
    pub fn fire(&mut self, options: &PartialOptions) {
        self.fire_with(&options.resolve(), None);
    }

    /// Fire resolved options, with an optional hook for when the session
    /// drains
    pub fn fire_with(&mut self, options: &ConfettiOptions, on_complete: Option<CompletionHook>) {
        let disabled = self.options.disable_for_reduced_motion || options.disable_for_reduced_motion;
        if disabled && self.motion.prefers_reduced_motion() {
            debug!("reduced motion requested, skipping fire");
            return;
        }

        let Some(canvas) = self.canvas() else {
            warn!("surface unavailable, skipping fire");
            return;
        };

        let spawned = self.controller.fire(options, canvas, on_complete);
        debug!(spawned, live = self.controller.live_particles(), "fired");
    }

    /// Fire every burst of `salvo` right away, ignoring delays. Use a
    /// `BurstQueue` to honour them.
    pub fn fire_salvo(&mut self, salvo: &Salvo) {
        for burst in &salvo.bursts {
            self.fire_with(&burst.options, None);
        }
    }

    /// Stop and clear everything immediately
    pub fn reset(&mut self) {
        self.controller.reset();
        self.session_canvas = None;
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn is_active(&self) -> bool {
        self.controller.phase() != Phase::Idle
    }

    pub fn controller(&self) -> &AnimationController<T> {
        &self.controller
    }

    pub fn driver_mut(&mut self) -> &mut T {
        self.controller.driver_mut()
    }

    pub fn create_options(&self) -> &CreateOptions {
        &self.options
    }

    /// Swap instance settings; takes effect from the next `fire`
    pub fn set_create_options(&mut self, options: CreateOptions) {
        self.options = options;
    }

    fn canvas(&mut self) -> Option<CanvasSize> {
        let current = self.surface.size().filter(|size| !size.is_empty())?;
        if self.controller.is_idle() || self.options.resize {
            self.session_canvas = Some(current);
        }
        Some(self.session_canvas.unwrap_or(current))
    }
}
