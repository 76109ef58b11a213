//! Confetti Core - Foundational types for the confetti overlay engine
//!
//! This crate provides the types that all other confetti crates depend on:
//! - `ParticleId` - Process-unique particle identifiers
//! - `Rgb` and the lenient hex color parser
//! - `CanvasSize`, `Origin` - Canvas-space geometry
//! - Error types and Result alias

mod color;
mod error;
mod id;
mod types;

pub use color::{colors_to_rgb, hex_to_rgb, Rgb};
pub use error::{ConfettiError, Result};
pub use id::ParticleId;
pub use types::{CanvasSize, Origin};
