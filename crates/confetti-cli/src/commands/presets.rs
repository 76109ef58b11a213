//! List the built-in presets

use anyhow::Result;
use confetti_particles::{ParticleRng, Preset};
use serde::Serialize;

#[derive(Serialize)]
struct PresetInfo {
    name: &'static str,
    description: &'static str,
    bursts: usize,
}

pub fn run(format: &str) -> Result<()> {
    // sample randomized presets once for burst counts
    let mut rng = ParticleRng::new(0);
    let infos: Vec<PresetInfo> = Preset::ALL
        .iter()
        .map(|p| PresetInfo {
            name: p.name(),
            description: p.description(),
            bursts: p.salvo(&mut rng).bursts.len(),
        })
        .collect();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&infos)?),
        _ => {
            for info in &infos {
                println!("{:<10} {}", info.name, info.description);
            }
        }
    }
    Ok(())
}
