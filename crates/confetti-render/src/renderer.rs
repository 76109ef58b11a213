//! The renderer capability set the animation controller drives

use confetti_core::CanvasSize;
use confetti_particles::Particle;

/// A drawing back-end bound to one surface.
///
/// Per frame the controller calls `clear`, then `draw_particle` once for each
/// live particle in order, then `present`. Backends that keep visual objects
/// across frames key them by particle id and must discard any object that was
/// not drawn in the current frame no later than `present`.
pub trait Renderer {
    /// Erase all visual output from the previous frame
    fn clear(&mut self);

    /// Render one particle. `canvas` is the surface size the particle's
    /// top-left-origin coordinates refer to.
    fn draw_particle(&mut self, particle: &Particle, canvas: CanvasSize);

    /// Flush the accumulated frame to the display
    fn present(&mut self);

    /// Human-readable name for this backend
    fn name(&self) -> &str;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn draw_particle(&mut self, particle: &Particle, canvas: CanvasSize) {
        (**self).draw_particle(particle, canvas)
    }

    fn present(&mut self) {
        (**self).present()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
