//! Named effects built on top of the fire options

use crate::options::{ConfettiOptions, PartialOptions};
use crate::rand::ParticleRng;
use crate::shape::{shape_from_text, ConfettiShape};
use confetti_core::{ConfettiError, Origin, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One `fire` call, delayed relative to the start of its salvo
#[derive(Clone, Debug, PartialEq)]
pub struct Burst {
    pub delay: Duration,
    pub options: ConfettiOptions,
}

/// An ordered sequence of bursts fired as one effect
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Salvo {
    pub bursts: Vec<Burst>,
}

impl Salvo {
    /// A salvo of a single immediate burst
    pub fn single(options: ConfettiOptions) -> Self {
        Self {
            bursts: vec![Burst {
                delay: Duration::ZERO,
                options,
            }],
        }
    }

    pub fn push(&mut self, delay: Duration, options: ConfettiOptions) {
        self.bursts.push(Burst { delay, options });
    }

    /// Apply the same overrides on top of every burst
    pub fn with_overrides(mut self, overrides: &PartialOptions) -> Self {
        for burst in &mut self.bursts {
            burst.options = overrides.clone().overlay(burst.options.clone());
        }
        self
    }

    pub fn total_particles(&self) -> i64 {
        self.bursts
            .iter()
            .map(|b| b.options.particle_count.max(0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }
}

/// Built-in effects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    Default,
    Explode,
    Snow,
    Hearts,
    Crackers,
    Fireworks,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Default,
        Preset::Explode,
        Preset::Snow,
        Preset::Hearts,
        Preset::Crackers,
        Preset::Fireworks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Explode => "explode",
            Preset::Snow => "snow",
            Preset::Hearts => "hearts",
            Preset::Crackers => "crackers",
            Preset::Fireworks => "fireworks",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Default => "single burst with the stock options",
            Preset::Explode => "wide, slow burst from the centre",
            Preset::Snow => "white flakes drifting down from the top",
            Preset::Hearts => "heart glyphs in reds and pinks",
            Preset::Crackers => "three party-cracker bursts, 250 ms apart",
            Preset::Fireworks => "two long-lived star bursts high on the screen",
        }
    }

    /// Build the salvo for this preset. Presets with randomized launch
    /// parameters draw them from `rng`.
    pub fn salvo(&self, rng: &mut ParticleRng) -> Salvo {
        match self {
            Preset::Default => Salvo::single(ConfettiOptions::default()),
            Preset::Explode => Salvo::single(explode(150, 180.0)),
            Preset::Snow => Salvo::single(snow(200)),
            Preset::Hearts => Salvo::single(hearts(50)),
            Preset::Crackers => crackers(rng),
            Preset::Fireworks => fireworks(rng),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfettiError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfettiError::UnknownPreset(s.to_string()))
    }
}

pub fn explode(particle_count: i64, spread: f64) -> ConfettiOptions {
    PartialOptions::new()
        .particle_count(particle_count)
        .spread(spread)
        .start_velocity(30.0)
        .gravity(0.5)
        .resolve()
}

pub fn snow(particle_count: i64) -> ConfettiOptions {
    PartialOptions::new()
        .particle_count(particle_count)
        .angle(270.0)
        .spread(180.0)
        .start_velocity(5.0)
        .gravity(0.3)
        .drift(0.5)
        .colors(["#FFFFFF"])
        .shapes(vec![ConfettiShape::Circle])
        .resolve()
}

pub fn hearts(particle_count: i64) -> ConfettiOptions {
    PartialOptions::new()
        .particle_count(particle_count)
        .colors(["#FF0000", "#FF69B4", "#FFB6C1"])
        .shapes(vec![shape_from_text("\u{2764}\u{fe0f}", Some(2.0), None, None)])
        .resolve()
}

const CRACKER_BURSTS: u32 = 3;
const CRACKER_INTERVAL: Duration = Duration::from_millis(250);

fn crackers(rng: &mut ParticleRng) -> Salvo {
    let mut salvo = Salvo::default();
    for index in 0..CRACKER_BURSTS {
        let options = PartialOptions::new()
            .particle_count(rng.range_inclusive(50, 100))
            .angle(rng.range(55.0, 125.0))
            .spread(rng.range(50.0, 70.0))
            .start_velocity(100.0)
            .decay(0.9)
            .gravity(1.0)
            .origin(rng.range(0.1, 0.9), rng.range(0.4, 0.8))
            .resolve();
        salvo.push(CRACKER_INTERVAL * index, options);
    }
    salvo
}

const FIREWORK_INTERVAL: Duration = Duration::from_millis(180);

fn fireworks(rng: &mut ParticleRng) -> Salvo {
    let shells = [
        (160, 95.0, 0.97, 0.9, 400, ["#ffffff", "#ffe066", "#ff6b6b", "#845ef7", "#4dabf7"]),
        (180, 100.0, 0.968, 0.95, 420, ["#ffffff", "#ffd43b", "#ff8787", "#7048e8", "#15aabf"]),
    ];

    let mut salvo = Salvo::default();
    for (index, (count, velocity, decay, gravity, ticks, colors)) in shells.into_iter().enumerate() {
        let options = ConfettiOptions {
            particle_count: count,
            angle: 90.0,
            spread: rng.range(200.0, 260.0),
            start_velocity: velocity,
            decay,
            gravity,
            ticks,
            origin: Origin::new(rng.range(0.2, 0.8), rng.range(0.15, 0.3)),
            colors: colors.iter().map(|c| c.to_string()).collect(),
            shapes: vec![ConfettiShape::Circle, ConfettiShape::Star],
            scalar: 2.0,
            ..Default::default()
        };
        salvo.push(FIREWORK_INTERVAL * index as u32, options);
    }
    salvo
}
