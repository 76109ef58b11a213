//! Headless effect-to-PNG render command

use super::{play_headless, EffectArgs};
use anyhow::{bail, Context, Result};
use confetti_render::{save_png, RasterRenderer};
use confetti_runtime::{Confetti, CreateOptions, ManualDriver};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

pub struct RenderArgs {
    pub effect: EffectArgs,
    pub output: String,
    pub every: u64,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let out_dir = PathBuf::from(&args.output);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut rng = args.effect.rng();
    let salvo = args.effect.salvo(&mut rng)?;
    let canvas = args.effect.canvas();
    let every = args.every.max(1);

    let written = Rc::new(RefCell::new(0u64));
    let failure: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));

    let renderer = {
        let out_dir = out_dir.clone();
        let written = Rc::clone(&written);
        let failure = Rc::clone(&failure);
        RasterRenderer::new(canvas).with_frame_sink(move |index, frame| {
            if index % every != 0 || failure.borrow().is_some() {
                return;
            }
            let path = frame_path(&out_dir, index);
            match save_png(frame, &path) {
                Ok(()) => {
                    debug!(path = %path.display(), "wrote frame");
                    *written.borrow_mut() += 1;
                }
                Err(e) => *failure.borrow_mut() = Some(e.to_string()),
            }
        })
    };

    let seed = args.effect.seed.unwrap_or_else(|| rng.range_inclusive(0, i64::MAX) as u64);
    let mut confetti = Confetti::create_seeded(
        canvas,
        renderer,
        ManualDriver::new(),
        CreateOptions::default(),
        seed,
    );

    info!(
        preset = %args.effect.preset,
        bursts = salvo.bursts.len(),
        particles = salvo.total_particles(),
        "rendering {}x{}",
        args.effect.width,
        args.effect.height
    );
    let frames = play_headless(&mut confetti, salvo, args.effect.max_frames, |_, _| {});

    if let Some(err) = failure.borrow_mut().take() {
        bail!(err);
    }

    let written = *written.borrow();
    println!(
        "Rendered {} frames, wrote {} PNG files to {}",
        frames,
        written,
        out_dir.display()
    );
    Ok(())
}

fn frame_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(format!("frame_{index:05}.png"))
}
