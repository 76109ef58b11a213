//! Confetti Particles - confetti simulation core
//!
//! Provides the rendering-agnostic half of the engine:
//! - `Particle` state and its fixed-order per-tick physics step
//! - `ConfettiOptions` / `PartialOptions` with documented defaults
//! - `spawn` for building a batch from options and a canvas size
//! - Shapes (primitives, paths, bitmaps, text) and named presets

pub mod factory;
pub mod options;
pub mod particle;
pub mod presets;
pub mod rand;
pub mod shape;

pub use factory::spawn;
pub use options::{defaults, ConfettiOptions, PartialOptions};
pub use particle::Particle;
pub use presets::{Burst, Preset, Salvo};
pub use rand::ParticleRng;
pub use shape::{
    shape_from_bitmap, shape_from_path, shape_from_text, star_points, BitmapHandle,
    ConfettiShape, ShapeMatrix,
};
