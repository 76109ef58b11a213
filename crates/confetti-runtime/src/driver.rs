//! Tick sources that decide when the next animation frame runs
//!
//! A tick source owns one frame callback at a time. Clock signals arrive via
//! `signal`; a `FrameLimiter` drops the ones that come too soon, so the
//! callback never runs more than once per target interval. The very first
//! signal after `start` always fires.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default animation cadence
pub const TARGET_FPS: f64 = 60.0;

/// What the frame callback wants next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Work run once per animation frame. Returning `Stop` ends the run and
/// releases the tick source.
pub type FrameCallback = Box<dyn FnMut() -> TickControl>;

/// The injected per-frame scheduling capability
pub trait TickSource {
    /// Begin invoking `callback` at the target cadence. Starting a source
    /// that is already running swaps the callback and keeps the same timer.
    fn start(&mut self, callback: FrameCallback);

    /// Stop and release the timer. Safe to call repeatedly and after the
    /// source stopped itself.
    fn cancel(&mut self);

    fn is_running(&self) -> bool;

    /// Deliver one clock signal observed at `now`. Returns true when the
    /// callback actually ran.
    fn signal(&mut self, now: Instant) -> bool;
}

/// Rate limiter for clock signals
#[derive(Clone, Debug)]
pub struct FrameLimiter {
    /// Minimum spacing between two frames
    pub interval: Duration,
    last_frame: Option<Instant>,
}

impl Default for FrameLimiter {
    fn default() -> Self {
        Self::with_rate(TARGET_FPS)
    }
}

impl FrameLimiter {
    /// Create a limiter with the default 60 Hz cadence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a limiter for a custom rate in frames per second
    pub fn with_rate(hz: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / hz.max(1.0)),
            last_frame: None,
        }
    }

    /// Returns true if a frame should run for a signal at `now`
    pub fn should_fire(&mut self, now: Instant) -> bool {
        match self.last_frame {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_frame = Some(now);
                true
            }
        }
    }

    /// Forget the last frame so the next signal fires immediately
    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

/// Callback slot shared by the drivers
struct FrameSlot {
    callback: Option<FrameCallback>,
    limiter: FrameLimiter,
    frames: u64,
}

impl FrameSlot {
    fn new(hz: f64) -> Self {
        Self {
            callback: None,
            limiter: FrameLimiter::with_rate(hz),
            frames: 0,
        }
    }

    fn install(&mut self, callback: FrameCallback) {
        if self.callback.is_none() {
            self.limiter.reset();
        }
        self.callback = Some(callback);
    }

    fn clear(&mut self) {
        self.callback = None;
        self.limiter.reset();
    }

    /// Runs the callback if one is installed and the limiter allows it.
    /// Returns (ran, stopped).
    fn signal(&mut self, now: Instant) -> (bool, bool) {
        let Some(callback) = self.callback.as_mut() else {
            return (false, false);
        };
        if !self.limiter.should_fire(now) {
            return (false, false);
        }
        self.frames += 1;
        if callback() == TickControl::Stop {
            self.clear();
            return (true, true);
        }
        (true, false)
    }
}

/// Driver pumped by its host, one signal at a time.
///
/// Keeps a virtual clock so `step` can produce frames at exactly the target
/// cadence without sleeping (headless rendering, tests).
pub struct ManualDriver {
    slot: FrameSlot,
    clock: Instant,
}

impl Default for ManualDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::with_rate(TARGET_FPS)
    }

    pub fn with_rate(hz: f64) -> Self {
        Self {
            slot: FrameSlot::new(hz),
            clock: Instant::now(),
        }
    }

    /// Advance the virtual clock by one interval and signal
    pub fn step(&mut self) -> bool {
        self.clock += self.slot.limiter.interval;
        let now = self.clock;
        self.signal(now)
    }

    /// Step until the callback stops or `max_frames` frames have run.
    /// Returns the number of frames run.
    pub fn run_until_stopped(&mut self, max_frames: usize) -> usize {
        let mut ran = 0;
        while self.is_running() && ran < max_frames {
            if self.step() {
                ran += 1;
            }
        }
        ran
    }

    /// Frames run since construction
    pub fn frames(&self) -> u64 {
        self.slot.frames
    }
}

impl TickSource for ManualDriver {
    fn start(&mut self, callback: FrameCallback) {
        self.slot.install(callback);
    }

    fn cancel(&mut self) {
        self.slot.clear();
    }

    fn is_running(&self) -> bool {
        self.slot.callback.is_some()
    }

    fn signal(&mut self, now: Instant) -> bool {
        self.slot.signal(now).0
    }
}

/// Driver backed by a clock thread.
///
/// The clock thread only produces wake-ups; the frame callback still runs
/// on the thread that owns the driver, when it calls `pump` or `wait`.
/// Wake-ups are stamped when they are received, and at most one is ever
/// queued, so a stalled owner never replays a backlog of frames.
pub struct ThreadedDriver {
    slot: FrameSlot,
    signal_rate: f64,
    signals: Option<Receiver<()>>,
    stop: Option<Sender<()>>,
    clock: Option<JoinHandle<()>>,
}

impl Default for ThreadedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadedDriver {
    pub fn new() -> Self {
        Self::with_rates(TARGET_FPS, TARGET_FPS)
    }

    /// `frame_rate` caps the callback; `signal_rate` is how often the clock
    /// thread ticks. A signal rate above the frame rate is throttled.
    pub fn with_rates(frame_rate: f64, signal_rate: f64) -> Self {
        Self {
            slot: FrameSlot::new(frame_rate),
            signal_rate: signal_rate.max(1.0),
            signals: None,
            stop: None,
            clock: None,
        }
    }

    /// Receiver for clock wake-ups while running, for use in `select!`
    /// loops. On each wake-up call `signal(Instant::now())`.
    pub fn signals(&self) -> Option<Receiver<()>> {
        self.signals.clone()
    }

    /// Handle a pending clock wake-up, if any. Returns the number of
    /// frames run.
    pub fn pump(&mut self) -> usize {
        let Some(rx) = self.signals.as_ref() else {
            return 0;
        };
        match rx.try_recv() {
            Ok(()) => usize::from(self.signal(Instant::now())),
            Err(TryRecvError::Empty) => 0,
            Err(TryRecvError::Disconnected) => {
                warn!("frame clock disconnected");
                self.cancel();
                0
            }
        }
    }

    /// Block until the next clock wake-up or `timeout`, then run a frame
    /// if the limiter allows it
    pub fn wait(&mut self, timeout: Duration) -> usize {
        let Some(rx) = self.signals.as_ref() else {
            return 0;
        };
        match rx.recv_timeout(timeout) {
            Ok(()) => usize::from(self.signal(Instant::now())),
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                self.cancel();
                0
            }
        }
    }

    pub fn frames(&self) -> u64 {
        self.slot.frames
    }

    fn spawn_clock(&mut self) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let period = Duration::from_secs_f64(1.0 / self.signal_rate);

        let handle = thread::Builder::new()
            .name("confetti-clock".into())
            .spawn(move || loop {
                match tx.try_send(()) {
                    // a full slot means the owner has not caught up yet
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Disconnected(())) => break,
                }
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    _ => break,
                }
            });

        match handle {
            Ok(handle) => {
                debug!(rate = self.signal_rate, "frame clock started");
                self.stop = Some(stop_tx);
                self.signals = Some(rx);
                self.clock = Some(handle);
            }
            Err(e) => warn!("failed to spawn frame clock: {e}"),
        }
    }

    fn stop_clock(&mut self) {
        // dropping the sender wakes the clock thread out of its wait
        self.stop = None;
        self.signals = None;
        if let Some(handle) = self.clock.take() {
            if handle.join().is_err() {
                warn!("frame clock thread panicked");
            }
            debug!("frame clock stopped");
        }
    }
}

impl TickSource for ThreadedDriver {
    fn start(&mut self, callback: FrameCallback) {
        self.slot.install(callback);
        if self.clock.is_none() {
            self.spawn_clock();
        }
    }

    fn cancel(&mut self) {
        self.slot.clear();
        self.stop_clock();
    }

    fn is_running(&self) -> bool {
        self.slot.callback.is_some()
    }

    fn signal(&mut self, now: Instant) -> bool {
        let (ran, stopped) = self.slot.signal(now);
        if stopped {
            trace!("frame callback stopped the clock");
            self.stop_clock();
        }
        ran
    }
}

impl Drop for ThreadedDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
