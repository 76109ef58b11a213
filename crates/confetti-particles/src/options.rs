//! Fire options: documented defaults, sparse overrides and resolution

use crate::shape::ConfettiShape;
use confetti_core::{ConfettiError, Origin, Result};
use serde::{Deserialize, Serialize};

/// Documented defaults for every fire option
pub mod defaults {
    pub const PARTICLE_COUNT: i64 = 100;
    pub const ANGLE: f64 = 90.0;
    pub const SPREAD: f64 = 120.0;
    pub const START_VELOCITY: f64 = 45.0;
    pub const DECAY: f64 = 0.9;
    pub const GRAVITY: f64 = 1.0;
    pub const DRIFT: f64 = 0.0;
    pub const TICKS: u32 = 120;
    pub const SCALAR: f64 = 1.0;
    pub const Z_INDEX: i32 = 100;
    pub const DISABLE_FOR_REDUCED_MOTION: bool = false;
    pub const FLAT: bool = false;
    pub const COLORS: [&str; 7] = [
        "#26ccff", "#a25afd", "#ff5e7e", "#88ff5a", "#fcff42", "#ffa62d", "#ff36ff",
    ];
}

/// Fully resolved options for one `fire` call. Never mutated after
/// construction; build a new one for each burst.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiOptions {
    /// Number of particles to spawn; zero or negative spawns nothing
    pub particle_count: i64,
    /// Launch direction in degrees (90 is straight up)
    pub angle: f64,
    /// Spread around `angle` in degrees
    pub spread: f64,
    pub start_velocity: f64,
    pub decay: f64,
    pub gravity: f64,
    pub drift: f64,
    /// Lifetime of every particle, in ticks
    pub ticks: u32,
    pub origin: Origin,
    pub colors: Vec<String>,
    pub shapes: Vec<ConfettiShape>,
    pub scalar: f64,
    pub z_index: i32,
    pub disable_for_reduced_motion: bool,
    pub flat: bool,
}

impl Default for ConfettiOptions {
    fn default() -> Self {
        Self {
            particle_count: defaults::PARTICLE_COUNT,
            angle: defaults::ANGLE,
            spread: defaults::SPREAD,
            start_velocity: defaults::START_VELOCITY,
            decay: defaults::DECAY,
            gravity: defaults::GRAVITY,
            drift: defaults::DRIFT,
            ticks: defaults::TICKS,
            origin: Origin::CENTER,
            colors: defaults::COLORS.iter().map(|c| c.to_string()).collect(),
            shapes: vec![ConfettiShape::Square, ConfettiShape::Circle],
            scalar: defaults::SCALAR,
            z_index: defaults::Z_INDEX,
            disable_for_reduced_motion: defaults::DISABLE_FOR_REDUCED_MOTION,
            flat: defaults::FLAT,
        }
    }
}

impl ConfettiOptions {
    /// Overlay the fields set in `partial` onto the defaults
    pub fn resolve(partial: &PartialOptions) -> Self {
        partial.clone().overlay(Self::default())
    }
}

/// Caller-supplied option set where every field is optional.
///
/// Deserializes from TOML tables and JSON objects; both snake_case and the
/// camelCase names used by web confetti configs are accepted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialOptions {
    #[serde(alias = "particleCount", skip_serializing_if = "Option::is_none")]
    pub particle_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
    #[serde(alias = "startVelocity", skip_serializing_if = "Option::is_none")]
    pub start_velocity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<ConfettiShape>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalar: Option<f64>,
    #[serde(alias = "zIndex", skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(alias = "disableForReducedMotion", skip_serializing_if = "Option::is_none")]
    pub disable_for_reduced_motion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat: Option<bool>,
}

impl PartialOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve against the documented defaults
    pub fn resolve(&self) -> ConfettiOptions {
        ConfettiOptions::resolve(self)
    }

    /// Resolve against an arbitrary base (a preset, say) instead of the defaults
    pub fn overlay(self, base: ConfettiOptions) -> ConfettiOptions {
        ConfettiOptions {
            particle_count: self.particle_count.unwrap_or(base.particle_count),
            angle: self.angle.unwrap_or(base.angle),
            spread: self.spread.unwrap_or(base.spread),
            start_velocity: self.start_velocity.unwrap_or(base.start_velocity),
            decay: self.decay.unwrap_or(base.decay),
            gravity: self.gravity.unwrap_or(base.gravity),
            drift: self.drift.unwrap_or(base.drift),
            ticks: self.ticks.unwrap_or(base.ticks),
            origin: self.origin.unwrap_or(base.origin),
            colors: self.colors.unwrap_or(base.colors),
            shapes: self.shapes.unwrap_or(base.shapes),
            scalar: self.scalar.unwrap_or(base.scalar),
            z_index: self.z_index.unwrap_or(base.z_index),
            disable_for_reduced_motion: self
                .disable_for_reduced_motion
                .unwrap_or(base.disable_for_reduced_motion),
            flat: self.flat.unwrap_or(base.flat),
        }
    }

    /// Parse from a TOML table (integer values are accepted for float fields)
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConfettiError::InvalidConfig(e.to_string()))
    }

    /// Parse from a JSON object such as `{"particleCount": 50, "spread": 70}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn particle_count(mut self, count: i64) -> Self {
        self.particle_count = Some(count);
        self
    }

    pub fn angle(mut self, degrees: f64) -> Self {
        self.angle = Some(degrees);
        self
    }

    pub fn spread(mut self, degrees: f64) -> Self {
        self.spread = Some(degrees);
        self
    }

    pub fn start_velocity(mut self, velocity: f64) -> Self {
        self.start_velocity = Some(velocity);
        self
    }

    pub fn decay(mut self, decay: f64) -> Self {
        self.decay = Some(decay);
        self
    }

    pub fn gravity(mut self, gravity: f64) -> Self {
        self.gravity = Some(gravity);
        self
    }

    pub fn drift(mut self, drift: f64) -> Self {
        self.drift = Some(drift);
        self
    }

    pub fn ticks(mut self, ticks: u32) -> Self {
        self.ticks = Some(ticks);
        self
    }

    pub fn origin(mut self, x: f64, y: f64) -> Self {
        self.origin = Some(Origin::new(x, y));
        self
    }

    pub fn colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn shapes(mut self, shapes: Vec<ConfettiShape>) -> Self {
        self.shapes = Some(shapes);
        self
    }

    pub fn scalar(mut self, scalar: f64) -> Self {
        self.scalar = Some(scalar);
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn disable_for_reduced_motion(mut self, disable: bool) -> Self {
        self.disable_for_reduced_motion = Some(disable);
        self
    }

    pub fn flat(mut self, flat: bool) -> Self {
        self.flat = Some(flat);
        self
    }
}
