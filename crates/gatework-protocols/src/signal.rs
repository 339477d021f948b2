//! Condition signal types and the bus contract.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::BusError;
use crate::job::{JobId, JobSpec};

/// Kinds of condition signals a bus can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// The job's initial delay has elapsed.
    DelayElapsed,
    /// The current period has elapsed.
    PeriodElapsed,
    /// The job's required constraint is satisfied.
    ConstraintMet,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::DelayElapsed => write!(f, "delay_elapsed"),
            SignalKind::PeriodElapsed => write!(f, "period_elapsed"),
            SignalKind::ConstraintMet => write!(f, "constraint_met"),
        }
    }
}

/// One delivered condition signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEnvelope {
    /// Job the signal is addressed to.
    pub job_id: JobId,

    /// Which condition was observed.
    pub kind: SignalKind,

    /// When the driver emitted the signal.
    pub timestamp: DateTime<Utc>,
}

impl SignalEnvelope {
    /// Create an envelope stamped with the current time.
    pub fn new(job_id: JobId, kind: SignalKind) -> Self {
        Self {
            job_id,
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// A job's registration with a signal bus.
pub struct JobRegistration {
    /// Identifier minted by the bus.
    pub job_id: JobId,

    /// The job's signal channel.
    pub signals: mpsc::Receiver<SignalEnvelope>,
}

/// Source of condition signals for registered jobs.
///
/// Delivery is at-least-once: duplicates are expected and consumers
/// must fold them idempotently. There is no ordering guarantee across
/// signal kinds. Senders wait for channel capacity, so a slow consumer
/// delays signals rather than losing them.
#[async_trait]
pub trait SignalBus: Send + Sync {
    /// Register a job, returning its id and signal channel.
    async fn register(&self, spec: &JobSpec) -> Result<JobRegistration, BusError>;

    /// Remove a job's registration. Unknown ids are a no-op.
    async fn unregister(&self, job_id: JobId) -> Result<(), BusError>;
}
