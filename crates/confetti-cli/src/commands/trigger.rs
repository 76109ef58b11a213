//! Check which effect a message would fire

use crate::config::{message_text, OverlayConfig};
use anyhow::{Context, Result};
use confetti_particles::ParticleRng;
use std::path::Path;

pub fn run(message: &str, config_path: &str, format: &str) -> Result<()> {
    let config = OverlayConfig::load(Path::new(config_path))
        .with_context(|| format!("Failed to load config {config_path}"))?;
    let text = message_text(message);
    let mut rng = ParticleRng::from_entropy();

    let rule = config.match_trigger(&text);
    let salvo = config.salvo_for(&text, &mut rng)?;

    let preset = match rule {
        Some(rule) => Some(rule.preset.as_deref().unwrap_or("default")),
        None => config.default_preset.as_deref(),
    };

    if format == "json" {
        let value = serde_json::json!({
            "text": text,
            "phrase": rule.map(|r| r.phrase.as_str()),
            "preset": preset,
            "bursts": salvo.as_ref().map(|s| s.bursts.len()).unwrap_or(0),
            "particles": salvo.as_ref().map(|s| s.total_particles()).unwrap_or(0),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match (rule, salvo) {
        (_, None) => println!("No trigger matches \"{text}\""),
        (Some(rule), Some(salvo)) => {
            println!(
                "\"{}\" fires {} ({} bursts, {} particles)",
                rule.phrase,
                preset.unwrap_or("default"),
                salvo.bursts.len(),
                salvo.total_particles()
            );
            for burst in &salvo.bursts {
                println!(
                    "  +{:>4} ms  {} particles",
                    burst.delay.as_millis(),
                    burst.options.particle_count
                );
            }
        }
        (None, Some(salvo)) => println!(
            "No trigger matches; default preset fires {} particles",
            salvo.total_particles()
        ),
    }
    Ok(())
}
