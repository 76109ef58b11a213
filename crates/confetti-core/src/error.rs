//! Error types for the confetti engine

use thiserror::Error;

/// The main error type for confetti operations.
///
/// The animation hot path (`fire`, `advance`, frame ticks) never returns
/// these; they surface from configuration loading, frame export and
/// backend construction.
#[derive(Debug, Error)]
pub enum ConfettiError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),
}

/// Result type alias for confetti operations
pub type Result<T> = std::result::Result<T, ConfettiError>;

impl From<toml::de::Error> for ConfettiError {
    fn from(err: toml::de::Error) -> Self {
        ConfettiError::TomlParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ConfettiError {
    fn from(err: serde_json::Error) -> Self {
        ConfettiError::JsonParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: ConfettiError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, ConfettiError::TomlParseError(_)));
    }

    #[test]
    fn display_includes_detail() {
        let err = ConfettiError::UnknownPreset("sparkles".into());
        assert_eq!(err.to_string(), "Unknown preset: sparkles");
    }
}
