//! Live listener: read messages from stdin and fire matching effects
//!
//! A reader thread forwards stdin lines over a channel; everything else
//! (matching, firing, ticking, rendering) happens on the main thread.

use crate::config::{message_text, OverlayConfig};
use anyhow::{Context, Result};
use confetti_core::CanvasSize;
use confetti_particles::ParticleRng;
use confetti_render::SceneRenderer;
use confetti_runtime::{BurstQueue, Confetti, ThreadedDriver, TickSource};
use crossbeam_channel::{never, select, unbounded, Receiver};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::cell::Cell;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const IDLE_WAIT: Duration = Duration::from_millis(250);
const REPORT_EVERY: u64 = 60;

pub struct ListenArgs {
    pub config: String,
    pub watch: bool,
}

pub fn run(args: ListenArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut config = if config_path.exists() {
        OverlayConfig::load(&config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        warn!(path = %config_path.display(), "config not found, using defaults");
        OverlayConfig::default()
    };
    info!(triggers = config.triggers.len(), "loaded overlay config");

    // Values the surface and motion preference read on every fire
    let canvas = Rc::new(Cell::new(config.canvas_size()));
    let reduced_motion = Rc::new(Cell::new(config.reduced_motion));

    let surface = {
        let canvas = Rc::clone(&canvas);
        move || Some(canvas.get())
    };
    let motion = {
        let reduced_motion = Rc::clone(&reduced_motion);
        move || reduced_motion.get()
    };
    let mut confetti = Confetti::create(
        surface,
        SceneRenderer::new(),
        ThreadedDriver::new(),
        config.confetti.clone(),
    )
    .with_motion_preference(motion);

    let (reload_tx, reloads) = unbounded();
    let _debouncer = if args.watch {
        let mut debouncer = new_debouncer(Duration::from_millis(500), move |res: DebounceEventResult| {
            let _ = reload_tx.send(res.is_ok());
        })
        .context("Failed to create file watcher")?;
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)
            .context("Failed to watch config file")?;
        info!(path = %config_path.display(), "watching config for changes");
        Some(debouncer)
    } else {
        None
    };

    let lines = spawn_stdin_reader()?;
    let mut stdin_open = true;
    let mut queue = BurstQueue::new();
    let mut rng = ParticleRng::from_entropy();
    let mut last_report = 0;

    info!("listening for messages on stdin");
    loop {
        let input = if stdin_open { lines.clone() } else { never() };
        let ticks = confetti.driver_mut().signals().unwrap_or_else(never);
        let wait = queue
            .next_due()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);

        select! {
            recv(input) -> line => match line {
                Ok(line) => handle_message(&line, &config, &mut queue, &mut rng),
                Err(_) => {
                    debug!("stdin closed");
                    stdin_open = false;
                }
            },
            recv(ticks) -> signal => {
                if signal.is_ok() {
                    if confetti.driver_mut().signal(Instant::now()) {
                        let frames = confetti.controller().frames_rendered();
                        if frames - last_report >= REPORT_EVERY {
                            last_report = frames;
                            info!(
                                frames,
                                live = confetti.controller().live_particles(),
                                phase = ?confetti.phase(),
                                "frame"
                            );
                        }
                    }
                }
            },
            recv(reloads) -> event => {
                if let Ok(ok) = event {
                    if ok {
                        reload(&config_path, &mut config, &canvas, &reduced_motion, &mut confetti);
                    } else {
                        warn!("config watch error");
                    }
                }
            },
            default(wait) => {}
        }

        for options in queue.take_due(Instant::now()) {
            confetti.fire_with(&options, None);
        }

        if !stdin_open && queue.is_empty() && !confetti.is_active() {
            break;
        }
    }

    info!(frames = confetti.controller().frames_rendered(), "listener finished");
    Ok(())
}

fn spawn_stdin_reader() -> Result<Receiver<String>> {
    let (tx, rx) = unbounded();
    std::thread::Builder::new()
        .name("confetti-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("stdin read error: {e}");
                        break;
                    }
                }
            }
        })
        .context("Failed to spawn stdin reader")?;
    Ok(rx)
}

fn handle_message(line: &str, config: &OverlayConfig, queue: &mut BurstQueue, rng: &mut ParticleRng) {
    let text = message_text(line);
    if text.is_empty() {
        return;
    }
    match config.salvo_for(&text, rng) {
        Ok(Some(salvo)) => {
            info!(message = %text, particles = salvo.total_particles(), "trigger matched");
            queue.schedule(salvo, Instant::now());
        }
        Ok(None) => debug!(message = %text, "no trigger matched"),
        Err(e) => warn!("failed to build effect: {e}"),
    }
}

fn reload(
    path: &Path,
    config: &mut OverlayConfig,
    canvas: &Cell<CanvasSize>,
    reduced_motion: &Cell<bool>,
    confetti: &mut Confetti<ThreadedDriver>,
) {
    match OverlayConfig::load(path) {
        Ok(fresh) => {
            canvas.set(fresh.canvas_size());
            reduced_motion.set(fresh.reduced_motion);
            confetti.set_create_options(fresh.confetti.clone());
            info!(triggers = fresh.triggers.len(), "config reloaded");
            *config = fresh;
        }
        Err(e) => warn!("config reload failed, keeping previous: {e}"),
    }
}
