//! Delayed bursts waiting for their turn

use confetti_particles::{ConfettiOptions, Salvo};
use std::time::Instant;
use tracing::trace;

/// A burst scheduled for a point in time
#[derive(Clone, Debug)]
struct Scheduled {
    due: Instant,
    options: ConfettiOptions,
}

/// Queue of bursts released to the controller thread once due
#[derive(Debug, Default)]
pub struct BurstQueue {
    // kept sorted by `due`; equal times keep insertion order
    pending: Vec<Scheduled>,
}

impl BurstQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule every burst of `salvo` relative to `now`
    pub fn schedule(&mut self, salvo: Salvo, now: Instant) {
        for burst in salvo.bursts {
            let due = now + burst.delay;
            let at = self.pending.partition_point(|s| s.due <= due);
            self.pending.insert(
                at,
                Scheduled {
                    due,
                    options: burst.options,
                },
            );
        }
        trace!(pending = self.pending.len(), "bursts scheduled");
    }

    /// Remove and return the bursts due at `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<ConfettiOptions> {
        let split = self.pending.partition_point(|s| s.due <= now);
        self.pending
            .drain(..split)
            .map(|s| s.options)
            .collect()
    }

    /// When the next burst becomes due
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.first().map(|s| s.due)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confetti_particles::{ParticleRng, PartialOptions, Preset};
    use std::time::Duration;

    fn opts(count: i64) -> ConfettiOptions {
        PartialOptions::new().particle_count(count).resolve()
    }

    #[test]
    fn releases_bursts_when_due() {
        let mut queue = BurstQueue::new();
        let t0 = Instant::now();
        let mut salvo = Salvo::single(opts(1));
        salvo.push(Duration::from_millis(250), opts(2));
        salvo.push(Duration::from_millis(500), opts(3));
        queue.schedule(salvo, t0);

        assert_eq!(queue.take_due(t0).len(), 1);
        assert!(queue.take_due(t0 + Duration::from_millis(100)).is_empty());
        assert_eq!(queue.next_due(), Some(t0 + Duration::from_millis(250)));

        let late = queue.take_due(t0 + Duration::from_secs(1));
        let counts: Vec<i64> = late.iter().map(|o| o.particle_count).collect();
        assert_eq!(counts, vec![2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn interleaves_overlapping_salvos() {
        let mut queue = BurstQueue::new();
        let t0 = Instant::now();
        let mut first = Salvo::single(opts(1));
        first.push(Duration::from_millis(300), opts(3));
        let mut second = Salvo::default();
        second.push(Duration::from_millis(100), opts(2));

        queue.schedule(first, t0);
        queue.schedule(second, t0 + Duration::from_millis(50));

        let order: Vec<i64> = queue
            .take_due(t0 + Duration::from_secs(1))
            .iter()
            .map(|o| o.particle_count)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn crackers_spread_over_time() {
        let mut queue = BurstQueue::new();
        let t0 = Instant::now();
        queue.schedule(Preset::Crackers.salvo(&mut ParticleRng::new(5)), t0);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.take_due(t0).len(), 1);
        queue.clear();
        assert!(queue.next_due().is_none());
    }
}
