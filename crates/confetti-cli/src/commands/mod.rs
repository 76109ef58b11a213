//! CLI command implementations

pub mod listen;
pub mod presets;
pub mod render;
pub mod simulate;
pub mod trigger;

use anyhow::{bail, Context, Result};
use clap::Args;
use confetti_core::CanvasSize;
use confetti_particles::{ParticleRng, PartialOptions, Preset, Salvo};
use confetti_runtime::{BurstQueue, Confetti, FrameLimiter, ManualDriver};
use std::time::Instant;

/// Which effect to run, shared by the headless commands
#[derive(Args, Debug, Clone)]
pub struct EffectArgs {
    /// Preset name (see `confetti presets`)
    #[arg(short, long, default_value = "default")]
    pub preset: String,

    /// Option overrides as JSON, e.g. '{"particleCount": 50, "spread": 70}'
    #[arg(long)]
    pub options: Option<String>,

    /// Option overrides from a TOML file (applied before --options)
    #[arg(long)]
    pub options_file: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Canvas width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Stop after this many frames even if the session is still running
    #[arg(long, default_value = "2000")]
    pub max_frames: u64,
}

impl EffectArgs {
    pub fn rng(&self) -> ParticleRng {
        match self.seed {
            Some(seed) => ParticleRng::new(seed),
            None => ParticleRng::from_entropy(),
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.width as f64, self.height as f64)
    }

    pub fn salvo(&self, rng: &mut ParticleRng) -> Result<Salvo> {
        let preset: Preset = self.preset.parse()?;
        let mut salvo = preset.salvo(rng);
        if let Some(path) = &self.options_file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file {path}"))?;
            let table: toml::value::Table =
                toml::from_str(&text).with_context(|| format!("Failed to parse {path}"))?;
            salvo = salvo.with_overrides(&PartialOptions::from_toml(&table)?);
        }
        if let Some(json) = &self.options {
            let overrides = PartialOptions::from_json(json).context("Invalid --options JSON")?;
            salvo = salvo.with_overrides(&overrides);
        }
        if salvo.total_particles() == 0 {
            bail!("effect '{}' spawns no particles", self.preset);
        }
        Ok(salvo)
    }
}

/// Play `salvo` to completion on a manual driver, honouring burst delays on
/// a virtual 60 Hz clock. `on_frame` runs after every rendered frame with
/// the frame index. Returns the number of frames rendered.
pub fn play_headless(
    confetti: &mut Confetti<ManualDriver>,
    salvo: Salvo,
    max_frames: u64,
    mut on_frame: impl FnMut(&Confetti<ManualDriver>, u64),
) -> u64 {
    let interval = FrameLimiter::new().interval;
    let start = Instant::now();
    let mut queue = BurstQueue::new();
    queue.schedule(salvo, start);

    let mut frames = 0;
    let mut elapsed = 0u32;
    while frames < max_frames {
        let now = start + interval * elapsed;
        elapsed += 1;
        for options in queue.take_due(now) {
            confetti.fire_with(&options, None);
        }

        if confetti.is_active() {
            if confetti.driver_mut().step() {
                frames += 1;
                on_frame(confetti, frames);
            }
        } else if queue.is_empty() {
            break;
        }
    }
    frames
}
