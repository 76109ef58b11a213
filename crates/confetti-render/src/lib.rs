//! Confetti Render - drawing backends for the confetti engine
//!
//! The controller only talks to the `Renderer` trait. Three backends are
//! provided and picked at construction time:
//! - `CommandRecorder`: records an ordered draw-command stream
//! - `RasterRenderer`: software rasterizer into an RGBA bitmap
//! - `SceneRenderer`: retained sprite nodes cached by particle id

mod command;
mod error;
mod raster;
mod renderer;
mod scene;

pub use command::{CommandRecorder, DrawCommand, Recording, RecordingHandle};
pub use error::RenderError;
pub use raster::{save_png, FrameSink, RasterRenderer};
pub use renderer::Renderer;
pub use scene::{SceneNode, SceneRenderer, SpriteInstance};
