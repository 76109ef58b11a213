//! Run a session headless and report per-frame statistics

use super::{play_headless, EffectArgs};
use anyhow::Result;
use confetti_render::CommandRecorder;
use confetti_runtime::{Confetti, CreateOptions, ManualDriver};
use serde::Serialize;

pub struct SimulateArgs {
    pub effect: EffectArgs,
    pub every: u64,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameStats {
    pub frame: u64,
    pub live: usize,
    pub drawn: usize,
    pub mean_opacity: f64,
    /// Axis-aligned bounds of the drawn wobble points: [min_x, min_y, max_x, max_y]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f64; 4]>,
}

#[derive(Debug, Serialize)]
struct Summary {
    preset: String,
    bursts: usize,
    particles: i64,
    frames: u64,
    samples: Vec<FrameStats>,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let mut rng = args.effect.rng();
    let salvo = args.effect.salvo(&mut rng)?;
    let bursts = salvo.bursts.len();
    let particles = salvo.total_particles();

    let (samples, frames) = simulate(&args.effect, salvo, args.every, rng.range_inclusive(0, i64::MAX) as u64);

    if args.format == "json" {
        let summary = Summary {
            preset: args.effect.preset.clone(),
            bursts,
            particles,
            frames,
            samples,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} ({} bursts, {} particles) on {}x{}",
        args.effect.preset, bursts, particles, args.effect.width, args.effect.height
    );
    println!("{:>6} {:>6} {:>6} {:>8}  bounds", "frame", "live", "drawn", "opacity");
    for s in &samples {
        let bounds = s
            .bounds
            .map(|[x0, y0, x1, y1]| format!("({x0:.0}, {y0:.0}) - ({x1:.0}, {y1:.0})"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:>6} {:>6} {:>6} {:>8.3}  {}",
            s.frame, s.live, s.drawn, s.mean_opacity, bounds
        );
    }
    println!("Session ended after {} frames", frames);
    Ok(())
}

/// Returns the sampled frame statistics and the total frame count
pub fn simulate(effect: &EffectArgs, salvo: confetti_particles::Salvo, every: u64, seed: u64) -> (Vec<FrameStats>, u64) {
    let recorder = CommandRecorder::with_history(1);
    let log = recorder.recording();
    let mut confetti = Confetti::create_seeded(
        effect.canvas(),
        recorder,
        ManualDriver::new(),
        CreateOptions::default(),
        effect.seed.unwrap_or(seed),
    );

    let every = every.max(1);
    let mut samples = Vec::new();
    let frames = play_headless(&mut confetti, salvo, effect.max_frames, |c, frame| {
        if frame % every != 0 && frame != 1 {
            return;
        }
        let rec = log.borrow();
        let drawn = rec.last_frame().unwrap_or_default();
        samples.push(stats(frame, c.controller().live_particles(), drawn));
    });
    (samples, frames)
}

fn stats(frame: u64, live: usize, drawn: &[confetti_render::DrawCommand]) -> FrameStats {
    let mean_opacity = if drawn.is_empty() {
        0.0
    } else {
        drawn.iter().map(|c| c.opacity).sum::<f64>() / drawn.len() as f64
    };
    let bounds = drawn.iter().fold(None, |acc: Option<[f64; 4]>, c| {
        Some(match acc {
            None => [c.x, c.y, c.x, c.y],
            Some([x0, y0, x1, y1]) => [x0.min(c.x), y0.min(c.y), x1.max(c.x), y1.max(c.y)],
        })
    });
    FrameStats {
        frame,
        live,
        drawn: drawn.len(),
        mean_opacity,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confetti_particles::{ParticleRng, Preset};

    fn effect(options: &str) -> EffectArgs {
        EffectArgs {
            preset: "default".into(),
            options: Some(options.into()),
            options_file: None,
            seed: Some(4),
            width: 400,
            height: 300,
            max_frames: 500,
        }
    }

    #[test]
    fn opacity_falls_and_session_drains() {
        let effect = effect(r#"{"particleCount": 20, "ticks": 10}"#);
        let salvo = effect.salvo(&mut effect.rng()).unwrap();
        let (samples, frames) = simulate(&effect, salvo, 1, 0);

        assert_eq!(frames, 9 + 5);
        assert_eq!(samples[0].drawn, 20);
        assert!((samples[0].mean_opacity - 0.9).abs() < 1e-9);
        for pair in samples[..9].windows(2) {
            assert!(pair[1].mean_opacity < pair[0].mean_opacity);
        }
        assert!(samples[9..].iter().all(|s| s.drawn == 0 && s.bounds.is_none()));
    }

    #[test]
    fn delayed_bursts_join_the_session() {
        let effect = effect("{}");
        let salvo = Preset::Crackers.salvo(&mut ParticleRng::new(1));
        let total = salvo.total_particles() as usize;
        let (samples, _) = simulate(&effect, salvo, 1, 0);

        let peak = samples.iter().map(|s| s.live).max().unwrap();
        assert_eq!(peak, total);
        // the first frame only has the first burst
        assert!(samples[0].live < total);
    }

    #[test]
    fn sampling_keeps_first_frame() {
        let effect = effect(r#"{"particleCount": 3, "ticks": 30}"#);
        let salvo = effect.salvo(&mut effect.rng()).unwrap();
        let (samples, _) = simulate(&effect, salvo, 10, 0);
        let frames: Vec<u64> = samples.iter().map(|s| s.frame).collect();
        assert_eq!(&frames[..4], &[1, 10, 20, 30]);
    }
}
