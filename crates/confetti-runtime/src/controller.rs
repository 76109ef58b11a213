//! Animation session state machine
//!
//! One controller owns at most one session. A session starts on the first
//! `fire`, absorbs every later `fire` until it ends, and ends either
//! naturally (five empty frames after the last particle expires) or through
//! `reset`.

use crate::driver::{TickControl, TickSource};
use confetti_core::CanvasSize;
use confetti_particles::{spawn, ConfettiOptions, Particle, ParticleRng};
use confetti_render::Renderer;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

/// Empty frames rendered after the last particle expires
pub const IDLE_DRAIN_FRAMES: u32 = 5;

/// Called once when a session drains naturally
pub type CompletionHook = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No session
    Idle,
    /// Ticking with live particles
    Running,
    /// No particles left, counting down the grace period
    Draining,
}

/// State shared between the controller and its frame callback
struct Session {
    particles: Vec<Particle>,
    renderer: Box<dyn Renderer>,
    canvas: CanvasSize,
    phase: Phase,
    idle_frames: u32,
    completion: Option<CompletionHook>,
    frames: u64,
}

impl Session {
    /// One animation frame: advance, draw survivors, present, then decide
    /// whether to keep ticking.
    fn frame(&mut self, rng: &mut ParticleRng) -> TickControl {
        if self.phase == Phase::Idle {
            return TickControl::Stop;
        }
        self.frames += 1;

        self.renderer.clear();
        self.particles.retain_mut(|p| p.advance(rng));
        for particle in &self.particles {
            self.renderer.draw_particle(particle, self.canvas);
        }
        self.renderer.present();

        if !self.particles.is_empty() {
            self.phase = Phase::Running;
            self.idle_frames = 0;
            return TickControl::Continue;
        }

        if self.phase != Phase::Draining {
            self.phase = Phase::Draining;
            self.idle_frames = 0;
        }
        self.idle_frames += 1;
        if self.idle_frames < IDLE_DRAIN_FRAMES {
            TickControl::Continue
        } else {
            TickControl::Stop
        }
    }
}

/// Owns the live particle set, the renderer and the tick source.
///
/// Everything here runs on the thread that owns the controller; other
/// threads hand work over through a channel.
pub struct AnimationController<T: TickSource> {
    session: Rc<RefCell<Session>>,
    rng: Rc<RefCell<ParticleRng>>,
    driver: T,
}

impl<T: TickSource> AnimationController<T> {
    pub fn new(renderer: Box<dyn Renderer>, driver: T) -> Self {
        Self::with_rng(renderer, driver, ParticleRng::from_entropy())
    }

    /// Controller with an explicit random source, for reproducible runs
    pub fn with_rng(renderer: Box<dyn Renderer>, driver: T, rng: ParticleRng) -> Self {
        Self {
            session: Rc::new(RefCell::new(Session {
                particles: Vec::new(),
                renderer,
                canvas: CanvasSize::default(),
                phase: Phase::Idle,
                idle_frames: 0,
                completion: None,
                frames: 0,
            })),
            rng: Rc::new(RefCell::new(rng)),
            driver,
        }
    }

    /// Spawn a batch for `options` on `canvas` and add it to the session.
    /// Returns the number of particles spawned.
    pub fn fire(
        &mut self,
        options: &ConfettiOptions,
        canvas: CanvasSize,
        on_complete: Option<CompletionHook>,
    ) -> usize {
        let batch = spawn(options, canvas, &mut self.rng.borrow_mut());
        let spawned = batch.len();
        self.add_particles(batch, canvas, on_complete);
        spawned
    }

    /// Add already-built particles. Starts a session when idle; otherwise
    /// appends to the running one and cancels any pending drain.
    ///
    /// A session keeps the first completion hook it was given; hooks passed
    /// while one is already set are dropped without being called.
    pub fn add_particles(
        &mut self,
        particles: Vec<Particle>,
        canvas: CanvasSize,
        on_complete: Option<CompletionHook>,
    ) {
        let starting = {
            let mut session = self.session.borrow_mut();
            session.particles.extend(particles);
            session.canvas = canvas;
            if session.completion.is_none() {
                session.completion = on_complete;
            }

            match session.phase {
                Phase::Idle => {
                    if session.particles.is_empty() {
                        // nothing to animate; the hook would never fire
                        session.completion = None;
                        debug!("ignoring empty batch while idle");
                        false
                    } else {
                        session.phase = Phase::Running;
                        session.idle_frames = 0;
                        true
                    }
                }
                Phase::Draining => {
                    if !session.particles.is_empty() {
                        session.phase = Phase::Running;
                        session.idle_frames = 0;
                    }
                    false
                }
                Phase::Running => false,
            }
        };

        if starting {
            info!(
                particles = self.session.borrow().particles.len(),
                renderer = self.session.borrow().renderer.name(),
                "confetti session started"
            );
            self.start_driver();
        }
    }

    /// Halt immediately: stop ticking, drop every particle and blank the
    /// renderer. The completion hook is discarded, not called.
    pub fn reset(&mut self) {
        self.driver.cancel();
        let mut session = self.session.borrow_mut();
        let dropped = session.particles.len();
        session.particles.clear();
        session.phase = Phase::Idle;
        session.idle_frames = 0;
        session.completion = None;
        session.renderer.clear();
        session.renderer.present();
        debug!(dropped, "confetti session reset");
    }

    pub fn phase(&self) -> Phase {
        self.session.borrow().phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    pub fn live_particles(&self) -> usize {
        self.session.borrow().particles.len()
    }

    /// Run `f` over the live particle set
    pub fn with_particles<R>(&self, f: impl FnOnce(&[Particle]) -> R) -> R {
        f(&self.session.borrow().particles)
    }

    /// Frames rendered since construction
    pub fn frames_rendered(&self) -> u64 {
        self.session.borrow().frames
    }

    pub fn renderer_name(&self) -> String {
        self.session.borrow().renderer.name().to_string()
    }

    pub fn driver(&self) -> &T {
        &self.driver
    }

    /// The tick source, for hosts that pump it themselves
    pub fn driver_mut(&mut self) -> &mut T {
        &mut self.driver
    }

    fn start_driver(&mut self) {
        let session = Rc::clone(&self.session);
        let rng = Rc::clone(&self.rng);

        self.driver.start(Box::new(move || {
            let control = session.borrow_mut().frame(&mut rng.borrow_mut());
            if control == TickControl::Stop {
                let hook = {
                    let mut s = session.borrow_mut();
                    let finished = s.phase == Phase::Draining;
                    s.phase = Phase::Idle;
                    s.idle_frames = 0;
                    if finished {
                        info!(frames = s.frames, "confetti session finished");
                    }
                    s.completion.take().filter(|_| finished)
                };
                // the borrow is released before user code runs
                if let Some(hook) = hook {
                    hook();
                }
            }
            control
        }));
    }
}

impl<T: TickSource> Drop for AnimationController<T> {
    fn drop(&mut self) {
        self.driver.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ManualDriver;
    use confetti_particles::PartialOptions;
    use confetti_render::{CommandRecorder, RecordingHandle};
    use std::cell::Cell;

    const CANVAS: CanvasSize = CanvasSize {
        width: 400.0,
        height: 300.0,
    };

    fn controller() -> (AnimationController<ManualDriver>, RecordingHandle) {
        let recorder = CommandRecorder::new();
        let log = recorder.recording();
        let controller =
            AnimationController::with_rng(Box::new(recorder), ManualDriver::new(), ParticleRng::new(42));
        (controller, log)
    }

    fn completion_counter() -> (Rc<Cell<u32>>, CompletionHook) {
        let calls = Rc::new(Cell::new(0));
        let hook_calls = Rc::clone(&calls);
        (calls, Box::new(move || hook_calls.set(hook_calls.get() + 1)))
    }

    fn options(count: i64, ticks: u32) -> ConfettiOptions {
        PartialOptions::new().particle_count(count).ticks(ticks).resolve()
    }

    #[test]
    fn fire_starts_session() {
        let (mut c, _) = controller();
        assert_eq!(c.fire(&options(10, 5), CANVAS, None), 10);
        assert_eq!(c.phase(), Phase::Running);
        assert!(c.driver().is_running());
        assert_eq!(c.live_particles(), 10);
    }

    #[test]
    fn idle_drain_runs_five_empty_frames() {
        let (mut c, log) = controller();
        let (calls, hook) = completion_counter();
        c.fire(&options(4, 3), CANVAS, Some(hook));

        // ticks 1 and 2 keep everything alive
        c.driver_mut().step();
        c.driver_mut().step();
        assert_eq!(log.borrow().last_frame().unwrap().len(), 4);

        // tick 3 expires the whole batch: first empty frame
        c.driver_mut().step();
        assert_eq!(c.phase(), Phase::Draining);
        assert_eq!(log.borrow().last_frame().unwrap().len(), 0);

        for _ in 0..3 {
            c.driver_mut().step();
            assert_eq!(c.phase(), Phase::Draining);
            assert_eq!(calls.get(), 0);
        }

        // fifth empty frame ends the session
        c.driver_mut().step();
        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.driver().is_running());
        assert_eq!(calls.get(), 1);
        assert_eq!(log.borrow().presents, 2 + 5);

        // nothing more happens
        assert!(!c.driver_mut().step());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn reentrant_fire_merges_batches() {
        let (mut c, log) = controller();
        let first = c.fire(&options(3, 10), CANVAS, None);
        let second = c.fire(&options(5, 10), CANVAS, None);
        assert_eq!(c.live_particles(), first + second);

        c.driver_mut().step();
        assert_eq!(log.borrow().last_frame().unwrap().len(), 8);
        assert_eq!(c.driver().frames(), 1);
    }

    #[test]
    fn fire_during_drain_resumes_running() {
        let (mut c, _) = controller();
        let (calls, hook) = completion_counter();
        c.fire(&options(2, 1), CANVAS, Some(hook));
        c.driver_mut().step();
        c.driver_mut().step();
        assert_eq!(c.phase(), Phase::Draining);

        c.fire(&options(2, 10), CANVAS, None);
        assert_eq!(c.phase(), Phase::Running);
        c.driver_mut().step();
        assert_eq!(c.phase(), Phase::Running);

        c.driver_mut().run_until_stopped(100);
        assert_eq!(calls.get(), 1);
        assert!(c.is_idle());
    }

    #[test]
    fn zero_velocity_particle_stays_put_and_expires() {
        let (mut c, _) = controller();
        let opts = PartialOptions::new()
            .particle_count(1)
            .ticks(3)
            .decay(1.0)
            .gravity(0.0)
            .drift(0.0)
            .start_velocity(0.0)
            .resolve();
        c.fire(&opts, CANVAS, None);
        let start = c.with_particles(|ps| (ps[0].x, ps[0].y));

        c.driver_mut().step();
        c.driver_mut().step();
        assert_eq!(c.with_particles(|ps| (ps[0].x, ps[0].y)), start);

        c.driver_mut().step();
        assert_eq!(c.live_particles(), 0);
    }

    #[test]
    fn reset_stops_drawing_and_skips_completion() {
        let (mut c, log) = controller();
        let (calls, hook) = completion_counter();
        c.fire(&options(6, 50), CANVAS, Some(hook));
        c.driver_mut().step();

        c.reset();
        let draws = log.borrow().draws;
        assert!(c.is_idle());
        assert!(!c.driver().is_running());

        assert!(!c.driver_mut().step());
        assert_eq!(log.borrow().draws, draws);
        assert_eq!(calls.get(), 0);

        c.reset();
        assert!(c.is_idle());
    }

    #[test]
    fn empty_batch_while_idle_is_ignored() {
        let (mut c, _) = controller();
        assert_eq!(c.fire(&options(0, 10), CANVAS, None), 0);
        assert!(c.is_idle());
        assert!(!c.driver().is_running());
    }

    #[test]
    fn survivors_keep_relative_order() {
        let (mut c, log) = controller();
        c.fire(&options(3, 2), CANVAS, None);
        c.fire(&options(3, 10), CANVAS, None);
        let long_lived: Vec<_> = c.with_particles(|ps| ps[3..].iter().map(|p| p.id).collect());

        c.driver_mut().step();
        c.driver_mut().step();
        let drawn: Vec<_> = log
            .borrow()
            .last_frame()
            .unwrap()
            .iter()
            .map(|cmd| cmd.id)
            .collect();
        assert_eq!(drawn, long_lived);
    }

    #[test]
    fn session_can_restart_after_completion() {
        let (mut c, _) = controller();
        c.fire(&options(1, 1), CANVAS, None);
        c.driver_mut().run_until_stopped(20);
        assert!(c.is_idle());

        c.fire(&options(1, 1), CANVAS, None);
        assert_eq!(c.phase(), Phase::Running);
        assert!(c.driver().is_running());
    }
}
