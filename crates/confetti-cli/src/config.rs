//! Overlay configuration file (`confetti.toml`)
//!
//! ```toml
//! reduced_motion = false
//! default_preset = "default"
//!
//! [canvas]
//! width = 1920
//! height = 1080
//!
//! [confetti]
//! disable_for_reduced_motion = true
//!
//! [[trigger]]
//! phrase = "congrats"
//! preset = "crackers"
//!
//! [[trigger]]
//! phrase = "snow"
//! preset = "snow"
//! options = { particleCount = 400 }
//! ```

use confetti_core::{CanvasSize, ConfettiError, Result};
use confetti_particles::{ParticleRng, PartialOptions, Preset, Salvo};
use confetti_runtime::CreateOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// A phrase that fires an effect when it appears in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub phrase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default)]
    pub options: PartialOptions,
}

impl TriggerRule {
    /// Case-insensitive substring match
    pub fn matches(&self, text: &str) -> bool {
        !self.phrase.is_empty() && text.to_lowercase().contains(&self.phrase.to_lowercase())
    }

    /// The salvo this rule fires: its preset (or the stock burst) with the
    /// rule's option overrides applied to every burst
    pub fn salvo(&self, rng: &mut ParticleRng) -> Result<Salvo> {
        Ok(salvo_for(self.preset.as_deref(), rng)?.with_overrides(&self.options))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub canvas: CanvasConfig,
    /// Stand-in for the platform's reduced-motion setting
    pub reduced_motion: bool,
    /// Preset fired for messages no trigger matches; none fires nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_preset: Option<String>,
    pub confetti: CreateOptions,
    #[serde(rename = "trigger")]
    pub triggers: Vec<TriggerRule>,
}

impl OverlayConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate. Unknown preset names are rejected here rather
    /// than at trigger time.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.canvas.width > 0.0 && self.canvas.height > 0.0) {
            return Err(ConfettiError::InvalidConfig(format!(
                "canvas size must be positive, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        for rule in &self.triggers {
            if rule.phrase.trim().is_empty() {
                return Err(ConfettiError::InvalidConfig(
                    "trigger phrase must not be empty".into(),
                ));
            }
            if let Some(name) = &rule.preset {
                name.parse::<Preset>()?;
            }
        }
        if let Some(name) = &self.default_preset {
            name.parse::<Preset>()?;
        }
        Ok(())
    }

    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize::new(self.canvas.width, self.canvas.height)
    }

    /// The first rule whose phrase occurs in `text`
    pub fn match_trigger(&self, text: &str) -> Option<&TriggerRule> {
        self.triggers.iter().find(|rule| rule.matches(text))
    }

    /// What `text` fires, if anything
    pub fn salvo_for(&self, text: &str, rng: &mut ParticleRng) -> Result<Option<Salvo>> {
        match self.match_trigger(text) {
            Some(rule) => rule.salvo(rng).map(Some),
            None => self
                .default_preset
                .as_deref()
                .map(|name| salvo_for(Some(name), rng))
                .transpose(),
        }
    }
}

fn salvo_for(preset: Option<&str>, rng: &mut ParticleRng) -> Result<Salvo> {
    let preset = match preset {
        Some(name) => name.parse::<Preset>()?,
        None => Preset::Default,
    };
    Ok(preset.salvo(rng))
}

#[derive(Deserialize)]
struct JsonMessage {
    text: String,
}

/// Extract the comment text from an incoming line: either a JSON object
/// with a `text` field or the raw line itself
pub fn message_text(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.starts_with('{') {
        if let Ok(msg) = serde_json::from_str::<JsonMessage>(trimmed) {
            return msg.text;
        }
    }
    trimmed.to_string()
}
