//! Periodic empty-room sweep.
//!
//! The scheduler does not touch the registry itself. It only decides when
//! a sweep is due; the registry actor awaits it alongside its command
//! channel:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         cmd = receiver.recv() => { /* handle one command */ }
//!         _ = sweeper.wait_for_sweep() => {
//!             let removed = registry.sweep_empty();
//!             sweeper.record_sweep(removed.len());
//!         }
//!     }
//! }
//! ```
//!
//! Since the actor handles one branch at a time, a sweep always runs
//! between two commands.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::SweepConfig;

/// Counters kept across the scheduler's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    pub total_sweeps: u64,
    pub rooms_removed: u64,
}

/// Decides when the next sweep is due.
#[derive(Debug)]
pub struct SweepScheduler {
    /// `None` when periodic sweeping is disabled.
    interval: Option<Duration>,
    next_sweep: Option<Instant>,
    paused: bool,
    metrics: SweepMetrics,
}

impl SweepScheduler {
    /// Schedules the first sweep one interval from now plus a random
    /// share of `initial_jitter`.
    pub fn new(config: SweepConfig) -> Self {
        let interval = (!config.interval.is_zero()).then_some(config.interval);

        let next_sweep = interval.map(|every| {
            let jitter_ms = config.initial_jitter.as_millis() as u64;
            let jitter = if jitter_ms > 0 {
                Duration::from_millis(rand::rng().random_range(0..jitter_ms))
            } else {
                Duration::ZERO
            };
            Instant::now() + every + jitter
        });

        match interval {
            Some(every) => debug!(interval_secs = every.as_secs_f64(), "sweep scheduler created"),
            None => debug!("periodic sweep disabled"),
        }

        Self {
            interval,
            next_sweep,
            paused: false,
            metrics: SweepMetrics::default(),
        }
    }

    /// Resolves when the next sweep is due, returning its sequence number
    /// (starting at 1).
    ///
    /// Pends forever while disabled or paused, which lets it sit in a
    /// `select!` next to branches that do make progress.
    pub async fn wait_for_sweep(&mut self) -> u64 {
        let (next, every) = match (self.next_sweep, self.interval) {
            (Some(next), Some(every)) if !self.paused => (next, every),
            _ => std::future::pending().await,
        };

        time::sleep_until(next).await;

        self.next_sweep = Some(Instant::now() + every);
        self.metrics.total_sweeps += 1;
        trace!(sweep = self.metrics.total_sweeps, "sweep due");
        self.metrics.total_sweeps
    }

    /// Records how many rooms the last sweep dropped.
    pub fn record_sweep(&mut self, removed: usize) {
        self.metrics.rooms_removed += removed as u64;
    }

    /// Stops all further sweeps. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(sweeps = self.metrics.total_sweeps, "sweep scheduler paused");
        }
    }

    pub fn metrics(&self) -> SweepMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every(secs: u64) -> SweepConfig {
        SweepConfig {
            interval: Duration::from_secs(secs),
            initial_jitter: Duration::ZERO,
        }
    }

    fn assert_about(elapsed: Duration, expected: Duration) {
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_fire_on_interval() {
        let mut s = SweepScheduler::new(every(60));
        let start = Instant::now();

        assert_eq!(s.wait_for_sweep().await, 1);
        assert_about(start.elapsed(), Duration::from_secs(60));
        assert_eq!(s.wait_for_sweep().await, 2);
        assert_about(start.elapsed(), Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_scheduler_never_fires() {
        let mut s = SweepScheduler::new(SweepConfig::disabled());
        let fired = time::timeout(Duration::from_secs(3600), s.wait_for_sweep()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_scheduler_never_fires() {
        let mut s = SweepScheduler::new(every(10));
        s.pause();
        s.pause();
        let fired = time::timeout(Duration::from_secs(100), s.wait_for_sweep()).await;
        assert!(fired.is_err());
        assert_eq!(s.metrics().total_sweeps, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_delays_only_first_sweep() {
        let mut s = SweepScheduler::new(SweepConfig {
            interval: Duration::from_secs(10),
            initial_jitter: Duration::from_secs(5),
        });
        let start = Instant::now();
        s.wait_for_sweep().await;
        let first = start.elapsed();
        assert!(first >= Duration::from_secs(10) && first < Duration::from_millis(15_050));

        let second_start = Instant::now();
        s.wait_for_sweep().await;
        assert_about(second_start.elapsed(), Duration::from_secs(10));
    }

    #[test]
    fn test_metrics_accumulate() {
        let mut s = SweepScheduler::new(SweepConfig::disabled());
        s.record_sweep(2);
        s.record_sweep(3);
        assert_eq!(s.metrics().rooms_removed, 5);
        assert_eq!(s.metrics().total_sweeps, 0);
    }
}
