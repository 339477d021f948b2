//! Wall-clock signal driver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gatework_protocols::{
    BusError, JobId, JobRegistration, JobSpec, Recurrence, SignalBus, SignalEnvelope, SignalKind,
};

use crate::config::DriverConfig;
use crate::probe::ConstraintProbe;

/// Driver that emits signals from tokio timers.
///
/// Per registered job it runs up to three emitter tasks:
///
/// - a delay task that sends `DelayElapsed` once the initial delay has
///   passed (skipped for a zero delay),
/// - a period task that sends `PeriodElapsed` on every period boundary,
///   timed from registration (skipped for one-shot jobs),
/// - a probe task that observes the [`ConstraintProbe`] on the
///   configured poll interval and sends `ConstraintMet` on every
///   observation while the probe reports satisfied (skipped when the
///   spec requires no constraint).
///
/// The repeated constraint reports are the driver's redelivery policy:
/// a scheduler that could not complete a fire re-attempts on the next
/// delivery, so retry cadence follows the poll interval.
pub struct IntervalSignalDriver {
    config: DriverConfig,
    probe: Arc<dyn ConstraintProbe>,
    jobs: DashMap<JobId, CancellationToken>,
    shutdown: CancellationToken,
}

impl IntervalSignalDriver {
    /// Create a driver with the default configuration.
    pub fn new(probe: Arc<dyn ConstraintProbe>) -> Self {
        Self::with_config(DriverConfig::default(), probe)
    }

    /// Create a driver with `config`.
    pub fn with_config(config: DriverConfig, probe: Arc<dyn ConstraintProbe>) -> Self {
        Self {
            config,
            probe,
            jobs: DashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Number of currently registered jobs.
    pub fn registered_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Stop every emitter task and refuse further registrations.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.jobs.clear();
    }

    fn spawn_delay_task(
        job_id: JobId,
        delay: Duration,
        tx: mpsc::Sender<SignalEnvelope>,
        token: CancellationToken,
    ) {
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = time::sleep(delay) => {}
            }
            debug!("job {} initial delay elapsed", job_id);
            let _ = tx
                .send(SignalEnvelope::new(job_id, SignalKind::DelayElapsed))
                .await;
        });
    }

    fn spawn_period_task(
        job_id: JobId,
        period: Duration,
        tx: mpsc::Sender<SignalEnvelope>,
        token: CancellationToken,
    ) {
        tokio::spawn(async move {
            // Period boundaries are timed from registration, not from
            // the end of the initial delay.
            let start = time::Instant::now() + period;
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                debug!("job {} period elapsed", job_id);
                if tx
                    .send(SignalEnvelope::new(job_id, SignalKind::PeriodElapsed))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        });
    }

    fn spawn_probe_task(
        job_id: JobId,
        probe: Arc<dyn ConstraintProbe>,
        poll: Duration,
        tx: mpsc::Sender<SignalEnvelope>,
        token: CancellationToken,
    ) {
        tokio::spawn(async move {
            // First observation happens immediately.
            let mut ticker = time::interval(poll);

            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                if !probe.is_satisfied().await {
                    continue;
                }
                if tx
                    .send(SignalEnvelope::new(job_id, SignalKind::ConstraintMet))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        });
    }
}

#[async_trait]
impl SignalBus for IntervalSignalDriver {
    async fn register(&self, spec: &JobSpec) -> Result<JobRegistration, BusError> {
        if self.shutdown.is_cancelled() {
            return Err(BusError::ShutDown);
        }

        let job_id = JobId::new();
        let (tx, rx) = mpsc::channel(self.config.signal_buffer);
        let token = self.shutdown.child_token();

        if !spec.initial_delay.is_zero() {
            Self::spawn_delay_task(job_id, spec.initial_delay, tx.clone(), token.clone());
        }
        if let Recurrence::Periodic(period) = spec.recurrence {
            Self::spawn_period_task(job_id, period, tx.clone(), token.clone());
        }
        if spec.requires_constraint {
            Self::spawn_probe_task(
                job_id,
                self.probe.clone(),
                self.config.constraint_poll(),
                tx.clone(),
                token.clone(),
            );
        }

        self.jobs.insert(job_id, token);
        debug!("registered job {} ({}) on interval driver", job_id, spec.name);

        Ok(JobRegistration {
            job_id,
            signals: rx,
        })
    }

    async fn unregister(&self, job_id: JobId) -> Result<(), BusError> {
        if let Some((_, token)) = self.jobs.remove(&job_id) {
            token.cancel();
            debug!("unregistered job {}", job_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    use crate::probe::StaticProbe;

    fn driver_with(probe: Arc<dyn ConstraintProbe>) -> IntervalSignalDriver {
        IntervalSignalDriver::new(probe)
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_signal_every_period() {
        let driver = driver_with(Arc::new(StaticProbe::satisfied()));
        let spec = JobSpec::new(Duration::from_secs(10));
        let mut registration = driver.register(&spec).await.unwrap();

        let first = registration.signals.recv().await.unwrap();
        assert_eq!(first.kind, SignalKind::PeriodElapsed);

        let second = registration.signals.recv().await.unwrap();
        assert_eq!(second.kind, SignalKind::PeriodElapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_period_signal_before_the_boundary() {
        let driver = driver_with(Arc::new(StaticProbe::satisfied()));
        let spec = JobSpec::new(Duration::from_secs(10));
        let mut registration = driver.register(&spec).await.unwrap();

        let early = timeout(Duration::from_secs(9), registration.signals.recv()).await;
        assert!(early.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_signal_after_initial_delay() {
        let driver = driver_with(Arc::new(StaticProbe::satisfied()));
        let spec = JobSpec::new(Duration::from_secs(100)).with_initial_delay(Duration::from_secs(5));
        let mut registration = driver.register(&spec).await.unwrap();

        let first = registration.signals.recv().await.unwrap();
        assert_eq!(first.kind, SignalKind::DelayElapsed);

        // Period boundary is timed from registration and has not hit yet.
        let early = timeout(Duration::from_secs(90), registration.signals.recv()).await;
        assert!(early.is_err());

        let next = registration.signals.recv().await.unwrap();
        assert_eq!(next.kind, SignalKind::PeriodElapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_constraint_signal_while_probe_satisfied() {
        let driver = driver_with(Arc::new(StaticProbe::satisfied()));
        let spec = JobSpec::new(Duration::from_secs(3_600)).with_required_constraint();
        let mut registration = driver.register(&spec).await.unwrap();

        let first = registration.signals.recv().await.unwrap();
        assert_eq!(first.kind, SignalKind::ConstraintMet);

        // Redelivered on the next poll while still satisfied.
        let second = registration.signals.recv().await.unwrap();
        assert_eq!(second.kind, SignalKind::ConstraintMet);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_poll_config_still_delivers_constraint_signals() {
        let config = DriverConfig {
            signal_buffer: 64,
            constraint_poll_ms: 0,
        };
        let driver =
            IntervalSignalDriver::with_config(config, Arc::new(StaticProbe::satisfied()));
        let spec = JobSpec::new(Duration::from_secs(3_600)).with_required_constraint();
        let mut registration = driver.register(&spec).await.unwrap();

        // The poll interval is floored, so the probe task survives and
        // the gate keeps reporting.
        let first = registration.signals.recv().await.unwrap();
        assert_eq!(first.kind, SignalKind::ConstraintMet);
    }

    #[tokio::test(start_paused = true)]
    async fn test_constraint_signal_stops_when_probe_unsatisfied() {
        let probe = Arc::new(StaticProbe::satisfied());
        let driver = driver_with(probe.clone());
        let spec = JobSpec::new(Duration::from_secs(3_600)).with_required_constraint();
        let mut registration = driver.register(&spec).await.unwrap();

        let first = registration.signals.recv().await.unwrap();
        assert_eq!(first.kind, SignalKind::ConstraintMet);

        probe.set(false);
        while registration.signals.try_recv().is_ok() {}

        let silent = timeout(Duration::from_secs(10), registration.signals.recv()).await;
        assert!(silent.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_spec_gets_no_period_signals() {
        let driver = driver_with(Arc::new(StaticProbe::satisfied()));
        let spec = JobSpec::one_shot().with_initial_delay(Duration::from_secs(3));
        let mut registration = driver.register(&spec).await.unwrap();

        let first = registration.signals.recv().await.unwrap();
        assert_eq!(first.kind, SignalKind::DelayElapsed);

        // Delay task was the only emitter; the channel closes after it.
        assert!(registration.signals.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregister_stops_emission() {
        let driver = driver_with(Arc::new(StaticProbe::satisfied()));
        let spec = JobSpec::new(Duration::from_secs(10));
        let mut registration = driver.register(&spec).await.unwrap();
        assert_eq!(driver.registered_jobs(), 1);

        driver.unregister(registration.job_id).await.unwrap();
        assert_eq!(driver.registered_jobs(), 0);

        // Emitter task exits and drops its sender.
        assert!(registration.signals.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_refuses_registration() {
        let driver = driver_with(Arc::new(StaticProbe::satisfied()));
        driver.shutdown();

        let result = driver.register(&JobSpec::new(Duration::from_secs(10))).await;
        assert!(matches!(result, Err(BusError::ShutDown)));
    }
}
