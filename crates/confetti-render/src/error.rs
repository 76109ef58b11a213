use confetti_core::ConfettiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to encode frame {path}: {reason}")]
    Encode { path: String, reason: String },
}

impl From<RenderError> for ConfettiError {
    fn from(err: RenderError) -> Self {
        ConfettiError::RenderError(err.to_string())
    }
}
