//! Manual signal driver for deterministic tests.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use gatework_protocols::{
    BusError, JobId, JobRegistration, JobSpec, SignalBus, SignalEnvelope, SignalKind,
};

use crate::config::DriverConfig;

/// Driver that delivers signals only when told to.
///
/// This is the test mode bus: each condition is reported with an
/// explicit call, so assertions can follow deliveries without any
/// timing dependence. Calls naming an unknown or unregistered job are
/// silent no-ops, matching the contract that late signals are ignored
/// rather than errors.
pub struct ManualSignalDriver {
    config: DriverConfig,
    senders: DashMap<JobId, mpsc::Sender<SignalEnvelope>>,
}

impl ManualSignalDriver {
    /// Create a driver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DriverConfig::default())
    }

    /// Create a driver with `config`.
    pub fn with_config(config: DriverConfig) -> Self {
        Self {
            config,
            senders: DashMap::new(),
        }
    }

    /// Report that a job's initial delay has elapsed.
    pub async fn set_initial_delay_met(&self, job_id: JobId) {
        self.send(job_id, SignalKind::DelayElapsed).await;
    }

    /// Report that a job's period has elapsed.
    pub async fn set_period_delay_met(&self, job_id: JobId) {
        self.send(job_id, SignalKind::PeriodElapsed).await;
    }

    /// Report that a job's constraints are satisfied.
    pub async fn set_all_constraints_met(&self, job_id: JobId) {
        self.send(job_id, SignalKind::ConstraintMet).await;
    }

    /// Number of currently registered jobs.
    pub fn registered_jobs(&self) -> usize {
        self.senders.len()
    }

    async fn send(&self, job_id: JobId, kind: SignalKind) {
        // Clone out of the map before awaiting so no shard lock is
        // held across the send.
        let Some(sender) = self.senders.get(&job_id).map(|entry| entry.clone()) else {
            debug!("signal {} for unknown job {}, ignoring", kind, job_id);
            return;
        };

        if sender.send(SignalEnvelope::new(job_id, kind)).await.is_err() {
            debug!("signal {} for job {} had no receiver, ignoring", kind, job_id);
        }
    }
}

impl Default for ManualSignalDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalBus for ManualSignalDriver {
    async fn register(&self, spec: &JobSpec) -> Result<JobRegistration, BusError> {
        let job_id = JobId::new();
        let (tx, rx) = mpsc::channel(self.config.signal_buffer);
        self.senders.insert(job_id, tx);

        debug!("registered job {} ({})", job_id, spec.name);

        Ok(JobRegistration {
            job_id,
            signals: rx,
        })
    }

    async fn unregister(&self, job_id: JobId) -> Result<(), BusError> {
        if self.senders.remove(&job_id).is_some() {
            debug!("unregistered job {}", job_id);
        }
        Ok(())
    }
}
