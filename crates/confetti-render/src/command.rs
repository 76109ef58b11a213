//! Backend-neutral draw commands and a recorder that captures them

use crate::renderer::Renderer;
use confetti_core::{CanvasSize, ParticleId, Rgb};
use confetti_particles::{ConfettiShape, Particle};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// One particle as a backend sees it: where, how big, how turned, how opaque.
///
/// Positions are canvas pixels with a top-left origin, taken from the
/// particle's wobble point; backends convert to their own convention.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub id: ParticleId,
    pub shape: ConfettiShape,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
    pub scalar: f64,
    pub opacity: f64,
    pub color: Rgb,
}

impl DrawCommand {
    pub fn from_particle(particle: &Particle) -> Self {
        Self {
            id: particle.id,
            shape: particle.shape.clone(),
            x: particle.wobble_x,
            y: particle.wobble_y,
            rotation: particle.rotation(),
            width: particle.width(),
            height: particle.height(),
            scalar: particle.scalar,
            opacity: particle.opacity(),
            color: particle.color,
        }
    }
}

/// Everything a `CommandRecorder` has seen so far
#[derive(Debug, Default)]
pub struct Recording {
    /// Number of `clear` calls
    pub clears: usize,
    /// Number of `present` calls
    pub presents: usize,
    /// Total `draw_particle` calls across all frames
    pub draws: usize,
    /// Presented frames, oldest first, capped at the recorder's history size
    pub frames: VecDeque<Vec<DrawCommand>>,
    pending: Vec<DrawCommand>,
}

impl Recording {
    /// The most recently presented frame
    pub fn last_frame(&self) -> Option<&[DrawCommand]> {
        self.frames.back().map(Vec::as_slice)
    }

    /// Commands drawn since the last `present`
    pub fn pending(&self) -> &[DrawCommand] {
        &self.pending
    }
}

/// Shared view onto a recorder that has been handed to a controller
pub type RecordingHandle = Rc<RefCell<Recording>>;

/// Records the ordered draw stream instead of rasterizing it.
///
/// Useful as a vector-style backend (replaying commands elsewhere) and for
/// observing exactly what the controller asked to draw.
pub struct CommandRecorder {
    recording: RecordingHandle,
    history: usize,
}

impl CommandRecorder {
    pub const DEFAULT_HISTORY: usize = 256;

    pub fn new() -> Self {
        Self::with_history(Self::DEFAULT_HISTORY)
    }

    /// Keep at most `history` presented frames
    pub fn with_history(history: usize) -> Self {
        Self {
            recording: Rc::new(RefCell::new(Recording::default())),
            history,
        }
    }

    /// Handle that stays valid after the recorder is boxed and moved away
    pub fn recording(&self) -> RecordingHandle {
        Rc::clone(&self.recording)
    }
}

impl Default for CommandRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CommandRecorder {
    fn clear(&mut self) {
        let mut rec = self.recording.borrow_mut();
        rec.clears += 1;
        rec.pending.clear();
    }

    fn draw_particle(&mut self, particle: &Particle, _canvas: CanvasSize) {
        let mut rec = self.recording.borrow_mut();
        rec.draws += 1;
        rec.pending.push(DrawCommand::from_particle(particle));
    }

    fn present(&mut self) {
        let mut rec = self.recording.borrow_mut();
        rec.presents += 1;
        let frame = std::mem::take(&mut rec.pending);
        if self.history == 0 {
            return;
        }
        if rec.frames.len() == self.history {
            rec.frames.pop_front();
        }
        rec.frames.push_back(frame);
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confetti_particles::{spawn, ParticleRng, PartialOptions};

    fn batch(count: i64) -> Vec<Particle> {
        let mut rng = ParticleRng::new(8);
        let options = PartialOptions::new().particle_count(count).resolve();
        spawn(&options, CanvasSize::new(200.0, 100.0), &mut rng)
    }

    #[test]
    fn records_frames_in_draw_order() {
        let mut recorder = CommandRecorder::new();
        let log = recorder.recording();
        let particles = batch(3);
        let canvas = CanvasSize::new(200.0, 100.0);

        recorder.clear();
        for p in &particles {
            recorder.draw_particle(p, canvas);
        }
        recorder.present();

        let rec = log.borrow();
        assert_eq!((rec.clears, rec.presents, rec.draws), (1, 1, 3));
        let ids: Vec<ParticleId> = rec.last_frame().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, particles.iter().map(|p| p.id).collect::<Vec<_>>());
    }

    #[test]
    fn history_is_capped() {
        let mut recorder = CommandRecorder::with_history(2);
        let log = recorder.recording();
        for _ in 0..5 {
            recorder.clear();
            recorder.present();
        }
        assert_eq!(log.borrow().frames.len(), 2);
        assert_eq!(log.borrow().presents, 5);
    }

    #[test]
    fn command_uses_wobble_point_and_opacity() {
        let mut p = batch(1).remove(0);
        let mut rng = ParticleRng::new(1);
        p.advance(&mut rng);
        let cmd = DrawCommand::from_particle(&p);
        assert_eq!((cmd.x, cmd.y), (p.wobble_x, p.wobble_y));
        assert_eq!(cmd.opacity, p.opacity());
        assert_eq!(cmd.rotation, p.rotation());
    }
}
