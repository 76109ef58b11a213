//! Particle state and the per-tick physics step

use crate::rand::ParticleRng;
use crate::shape::ConfettiShape;
use confetti_core::{ParticleId, Rgb};
use std::f64::consts::PI;

/// Flattening factor applied to the rendered width/height of every piece
pub const OVAL_SCALAR: f64 = 0.6;

/// Tilt advance per tick, in radians
pub const TILT_STEP: f64 = 0.1;

/// Upper bound for a particle's wobble speed
pub const MAX_WOBBLE_SPEED: f64 = 0.11;

/// Simulation state of one confetti piece.
///
/// Coordinates are canvas pixels (origin top-left, y down). Particles are
/// owned by the animation controller and dropped, never recycled, once they
/// expire.
#[derive(Clone, Debug)]
pub struct Particle {
    pub id: ParticleId,

    pub x: f64,
    pub y: f64,
    /// Scalar speed, multiplied by `decay` every tick
    pub velocity: f64,
    /// Heading in radians, fixed at spawn
    pub angle2d: f64,
    pub drift: f64,
    /// Per-tick vertical bias (already 3x the configured gravity)
    pub gravity: f64,
    pub decay: f64,

    pub wobble: f64,
    pub wobble_speed: f64,
    pub wobble_x: f64,
    pub wobble_y: f64,

    pub tilt_angle: f64,
    pub tilt_sin: f64,
    pub tilt_cos: f64,

    pub color: Rgb,
    pub shape: ConfettiShape,
    pub scalar: f64,
    pub oval_scalar: f64,

    pub tick: u32,
    pub total_ticks: u32,

    /// Corner jitter, resampled every tick unless flat
    pub random: f64,
    /// Disables wobble and tilt
    pub flat: bool,
}

impl Particle {
    /// Advance one tick. Returns false once the particle has used up its
    /// lifetime and should be dropped.
    ///
    /// The order is fixed: move, then decay, then wobble/tilt.
    pub fn advance(&mut self, rng: &mut ParticleRng) -> bool {
        self.x += self.angle2d.cos() * self.velocity + self.drift;
        self.y += self.angle2d.sin() * self.velocity + self.gravity;
        self.velocity *= self.decay;

        if self.flat {
            self.wobble = 0.0;
            self.wobble_x = self.x + 10.0 * self.scalar;
            self.wobble_y = self.y + 10.0 * self.scalar;
            self.tilt_sin = 0.0;
            self.tilt_cos = 0.0;
            self.random = 1.0;
        } else {
            self.wobble += self.wobble_speed;
            self.wobble_x = self.x + 10.0 * self.scalar * self.wobble.cos();
            self.wobble_y = self.y + 10.0 * self.scalar * self.wobble.sin();

            self.tilt_angle += TILT_STEP;
            self.tilt_sin = self.tilt_angle.sin();
            self.tilt_cos = self.tilt_angle.cos();
            self.random = rng.next_f64() + 2.0;
        }

        self.tick += 1;
        self.tick < self.total_ticks
    }

    pub fn is_expired(&self) -> bool {
        self.tick >= self.total_ticks
    }

    /// Fraction of the lifetime used, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.total_ticks == 0 {
            1.0
        } else {
            (self.tick as f64 / self.total_ticks as f64).min(1.0)
        }
    }

    /// Linear fade-out over the lifetime
    pub fn opacity(&self) -> f64 {
        1.0 - self.progress()
    }

    pub fn x1(&self) -> f64 {
        self.x + self.random * self.tilt_cos
    }

    pub fn y1(&self) -> f64 {
        self.y + self.random * self.tilt_sin
    }

    pub fn x2(&self) -> f64 {
        self.wobble_x + self.random * self.tilt_cos
    }

    pub fn y2(&self) -> f64 {
        self.wobble_y + self.random * self.tilt_sin
    }

    /// Rendered width, flattened by the oval scalar
    pub fn width(&self) -> f64 {
        (self.x2() - self.x1()).abs() * self.oval_scalar
    }

    /// Rendered height, flattened by the oval scalar
    pub fn height(&self) -> f64 {
        (self.y2() - self.y1()).abs() * self.oval_scalar
    }

    /// Rendered rotation in radians
    pub fn rotation(&self) -> f64 {
        (PI / 10.0) * self.wobble
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_particle(total_ticks: u32) -> Particle {
        Particle {
            id: ParticleId::next(),
            x: 100.0,
            y: 50.0,
            velocity: 0.0,
            angle2d: -PI / 2.0,
            drift: 0.0,
            gravity: 0.0,
            decay: 1.0,
            wobble: 0.0,
            wobble_speed: 0.1,
            wobble_x: 0.0,
            wobble_y: 0.0,
            tilt_angle: PI / 2.0,
            tilt_sin: 0.0,
            tilt_cos: 0.0,
            color: Rgb::WHITE,
            shape: ConfettiShape::Square,
            scalar: 1.0,
            oval_scalar: OVAL_SCALAR,
            tick: 0,
            total_ticks,
            random: 2.5,
            flat: false,
        }
    }

    #[test]
    fn advance_moves_then_decays() {
        let mut rng = ParticleRng::new(1);
        let mut p = still_particle(10);
        p.velocity = 10.0;
        p.angle2d = 0.0;
        p.decay = 0.5;
        p.drift = 1.0;
        p.gravity = 3.0;

        assert!(p.advance(&mut rng));
        // position used the pre-decay velocity
        assert!((p.x - 111.0).abs() < 1e-9);
        assert!((p.y - 53.0).abs() < 1e-9);
        assert!((p.velocity - 5.0).abs() < 1e-9);

        p.advance(&mut rng);
        assert!((p.x - 117.0).abs() < 1e-9);
        assert!((p.y - 56.0).abs() < 1e-9);
    }

    #[test]
    fn zero_velocity_never_moves() {
        let mut rng = ParticleRng::new(2);
        let mut p = still_particle(3);
        assert!(p.advance(&mut rng));
        assert!(p.advance(&mut rng));
        assert!(!p.advance(&mut rng));
        assert_eq!((p.x, p.y), (100.0, 50.0));
        assert_eq!(p.tick, 3);
        assert!(p.is_expired());
    }

    #[test]
    fn wobble_and_tilt_advance() {
        let mut rng = ParticleRng::new(3);
        let mut p = still_particle(10);
        p.advance(&mut rng);
        assert!((p.wobble - 0.1).abs() < 1e-9);
        assert!((p.tilt_angle - (PI / 2.0 + TILT_STEP)).abs() < 1e-9);
        assert!((p.wobble_x - (p.x + 10.0 * 0.1_f64.cos())).abs() < 1e-9);
        assert!((p.wobble_y - (p.y + 10.0 * 0.1_f64.sin())).abs() < 1e-9);
        assert!((2.0..3.0).contains(&p.random));
        assert!((p.tilt_sin - p.tilt_angle.sin()).abs() < 1e-12);
    }

    #[test]
    fn flat_mode_disables_wobble() {
        let mut rng = ParticleRng::new(4);
        let mut p = still_particle(10);
        p.flat = true;
        p.wobble = 3.0;
        p.scalar = 2.0;
        p.advance(&mut rng);
        assert_eq!(p.wobble, 0.0);
        assert_eq!(p.wobble_x, p.x + 20.0);
        assert_eq!(p.wobble_y, p.y + 20.0);
        assert_eq!((p.tilt_sin, p.tilt_cos), (0.0, 0.0));
        assert_eq!(p.random, 1.0);
        assert_eq!(p.rotation(), 0.0);
        // tilt angle is left alone in flat mode
        assert_eq!(p.tilt_angle, PI / 2.0);
    }

    #[test]
    fn opacity_fades_linearly() {
        let mut rng = ParticleRng::new(5);
        let mut p = still_particle(4);
        assert_eq!(p.opacity(), 1.0);
        p.advance(&mut rng);
        assert!((p.opacity() - 0.75).abs() < 1e-12);
        p.advance(&mut rng);
        p.advance(&mut rng);
        p.advance(&mut rng);
        assert_eq!(p.opacity(), 0.0);
    }

    #[test]
    fn zero_lifetime_is_fully_transparent() {
        let p = still_particle(0);
        assert_eq!(p.progress(), 1.0);
        assert_eq!(p.opacity(), 0.0);
        assert!(p.is_expired());
    }

    #[test]
    fn derived_geometry() {
        let mut p = still_particle(10);
        p.random = 2.0;
        p.tilt_cos = 0.5;
        p.tilt_sin = -0.5;
        p.wobble_x = 110.0;
        p.wobble_y = 45.0;
        p.wobble = 5.0;
        assert_eq!(p.x1(), 101.0);
        assert_eq!(p.y1(), 49.0);
        assert_eq!(p.x2(), 111.0);
        assert_eq!(p.y2(), 44.0);
        assert!((p.width() - 10.0 * OVAL_SCALAR).abs() < 1e-9);
        assert!((p.height() - 5.0 * OVAL_SCALAR).abs() < 1e-9);
        assert!((p.rotation() - PI / 2.0).abs() < 1e-12);
    }
}
