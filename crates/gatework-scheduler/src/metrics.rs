//! Scheduler metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};

/// Per-job scheduler metrics.
#[derive(Debug, Default)]
pub struct SchedulerMetrics {
    /// Signals received on the job channel.
    pub signals_received: AtomicU64,

    /// Signals that flipped no flag (duplicates, late deliveries).
    pub signals_redundant: AtomicU64,

    /// Evaluation passes over the readiness flags.
    pub evaluations: AtomicU64,

    /// Fires attempted.
    pub fires_attempted: AtomicU64,

    /// Fires completed successfully.
    pub fires_succeeded: AtomicU64,

    /// Fires that failed and left the window armed.
    pub fires_failed: AtomicU64,

    /// Registration time.
    started_at: parking_lot::RwLock<Option<Instant>>,
}

impl SchedulerMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the registration of the job.
    pub fn mark_start(&self) {
        *self.started_at.write() = Some(Instant::now());
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at
            .read()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    /// Record a received signal.
    pub fn record_signal(&self) {
        self.signals_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a signal that flipped no flag.
    pub fn record_redundant_signal(&self) {
        self.signals_redundant.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an evaluation pass.
    pub fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fire attempt.
    pub fn record_fire_attempt(&self) {
        self.fires_attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful fire.
    pub fn record_fire_success(&self) {
        self.fires_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed fire.
    pub fn record_fire_failure(&self) {
        self.fires_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of the metrics.
    pub fn snapshot(&self) -> SchedulerMetricsSnapshot {
        SchedulerMetricsSnapshot {
            timestamp: Utc::now(),
            uptime_secs: self.uptime_secs(),
            signals_received: self.signals_received.load(Ordering::Relaxed),
            signals_redundant: self.signals_redundant.load(Ordering::Relaxed),
            evaluations: self.evaluations.load(Ordering::Relaxed),
            fires_attempted: self.fires_attempted.load(Ordering::Relaxed),
            fires_succeeded: self.fires_succeeded.load(Ordering::Relaxed),
            fires_failed: self.fires_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of scheduler metrics at a point in time.
#[derive(Debug, Clone)]
pub struct SchedulerMetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
    pub signals_received: u64,
    pub signals_redundant: u64,
    pub evaluations: u64,
    pub fires_attempted: u64,
    pub fires_succeeded: u64,
    pub fires_failed: u64,
}

impl SchedulerMetricsSnapshot {
    /// Fraction of fire attempts that succeeded.
    pub fn fire_success_rate(&self) -> f64 {
        if self.fires_attempted == 0 {
            return 0.0;
        }
        self.fires_succeeded as f64 / self.fires_attempted as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = SchedulerMetrics::new();
        metrics.record_signal();
        metrics.record_signal();
        metrics.record_redundant_signal();
        metrics.record_evaluation();
        metrics.record_fire_attempt();
        metrics.record_fire_success();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.signals_received, 2);
        assert_eq!(snapshot.signals_redundant, 1);
        assert_eq!(snapshot.evaluations, 1);
        assert_eq!(snapshot.fires_attempted, 1);
        assert_eq!(snapshot.fires_succeeded, 1);
        assert_eq!(snapshot.fires_failed, 0);
    }

    #[test]
    fn test_fire_success_rate() {
        let metrics = SchedulerMetrics::new();
        assert_eq!(metrics.snapshot().fire_success_rate(), 0.0);

        metrics.record_fire_attempt();
        metrics.record_fire_failure();
        metrics.record_fire_attempt();
        metrics.record_fire_success();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.fire_success_rate(), 0.5);
    }

    #[test]
    fn test_uptime_starts_at_zero() {
        let metrics = SchedulerMetrics::new();
        assert_eq!(metrics.uptime_secs(), 0);

        metrics.mark_start();
        // Freshly marked, still within the first second.
        assert_eq!(metrics.uptime_secs(), 0);
    }
}
