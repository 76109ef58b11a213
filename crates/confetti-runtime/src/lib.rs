//! Confetti Runtime - session control for the confetti engine
//!
//! Provides:
//! - `TickSource` with `ManualDriver` (host-pumped) and `ThreadedDriver`
//!   (clock thread), both rate-limited by `FrameLimiter`
//! - `AnimationController`, the Idle/Running/Draining session machine
//! - `Confetti`, a caller-owned instance bound to a surface and renderer
//! - `BurstQueue` for salvos whose bursts are spread over time

mod bursts;
mod confetti;
mod controller;
mod driver;

pub use bursts::BurstQueue;
pub use confetti::{Confetti, CreateOptions, MotionPreference, Surface};
pub use controller::{AnimationController, CompletionHook, Phase, IDLE_DRAIN_FRAMES};
pub use driver::{
    FrameCallback, FrameLimiter, ManualDriver, ThreadedDriver, TickControl, TickSource, TARGET_FPS,
};
