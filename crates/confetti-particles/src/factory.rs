//! Spawns particle batches from resolved options

use crate::options::ConfettiOptions;
use crate::particle::{Particle, MAX_WOBBLE_SPEED, OVAL_SCALAR};
use crate::rand::ParticleRng;
use crate::shape::ConfettiShape;
use confetti_core::{colors_to_rgb, CanvasSize, ParticleId, Rgb};
use std::f64::consts::PI;
use tracing::{debug, trace};

/// Create `options.particle_count` particles launched from the options'
/// origin on `canvas`.
///
/// Every particle of a batch starts at the same point; angle and spread
/// provide the variety. Colors are assigned cyclically in palette order,
/// shapes are picked uniformly.
pub fn spawn(options: &ConfettiOptions, canvas: CanvasSize, rng: &mut ParticleRng) -> Vec<Particle> {
    let count = usize::try_from(options.particle_count).unwrap_or(0);
    if count == 0 {
        trace!(requested = options.particle_count, "empty batch");
        return Vec::new();
    }

    let palette = colors_to_rgb(&options.colors);
    if palette.is_empty() {
        debug!("no colors configured, spawning black particles");
    }
    let (start_x, start_y) = canvas.point_at(options.origin);
    let rad_angle = options.angle.to_radians();
    let rad_spread = options.spread.to_radians();

    (0..count)
        .map(|i| {
            let color = if palette.is_empty() {
                Rgb::BLACK
            } else {
                palette[i % palette.len()]
            };
            let shape = if options.shapes.is_empty() {
                ConfettiShape::Square
            } else {
                options.shapes[rng.index(options.shapes.len())].clone()
            };

            Particle {
                id: ParticleId::next(),
                x: start_x,
                y: start_y,
                wobble: rng.range(0.0, 10.0),
                wobble_speed: MAX_WOBBLE_SPEED.min(rng.range(0.0, 0.1) + 0.05),
                velocity: options.start_velocity * 0.5 + rng.next_f64() * options.start_velocity,
                angle2d: -rad_angle + (0.5 * rad_spread - rng.next_f64() * rad_spread),
                tilt_angle: rng.range(0.25, 0.75) * PI,
                color,
                shape,
                tick: 0,
                total_ticks: options.ticks,
                decay: options.decay,
                drift: options.drift,
                random: rng.next_f64() + 2.0,
                tilt_sin: 0.0,
                tilt_cos: 0.0,
                wobble_x: 0.0,
                wobble_y: 0.0,
                gravity: options.gravity * 3.0,
                oval_scalar: OVAL_SCALAR,
                scalar: options.scalar,
                flat: options.flat,
            }
        })
        .collect()
}
