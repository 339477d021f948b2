//! Job specification types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SpecError;

/// Opaque identifier for a registered job.
///
/// Minted by the signal bus at registration and stable for the
/// lifetime of the scheduler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Mint a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How often a job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    /// Fires once per elapsed period, indefinitely.
    Periodic(Duration),
    /// Fires once, then completes.
    Once,
}

/// Immutable description of a schedulable job.
///
/// Built with the constructors below, validated at registration, never
/// mutated afterwards. The three gates a fire waits on are all
/// expressed here: the recurrence (period gate), the initial delay
/// (delay gate, first window only) and the required-constraint flag
/// (constraint gate, every window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Name for logs and diagnostics.
    pub name: String,

    /// Recurrence of the job.
    pub recurrence: Recurrence,

    /// Delay before the first window opens. Zero means the delay gate
    /// starts satisfied.
    pub initial_delay: Duration,

    /// Whether an external constraint gates every fire.
    pub requires_constraint: bool,
}

impl JobSpec {
    /// Create a periodic spec firing once per `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            name: "job".to_string(),
            recurrence: Recurrence::Periodic(period),
            initial_delay: Duration::ZERO,
            requires_constraint: false,
        }
    }

    /// Create a one-shot spec: fires a single time once its delay and
    /// constraint gates hold, then completes.
    pub fn one_shot() -> Self {
        Self {
            name: "job".to_string(),
            recurrence: Recurrence::Once,
            initial_delay: Duration::ZERO,
            requires_constraint: false,
        }
    }

    /// Set the job name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the delay before the first window.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Require the external constraint for every fire.
    pub fn with_required_constraint(mut self) -> Self {
        self.requires_constraint = true;
        self
    }

    /// The period of a periodic spec.
    pub fn period(&self) -> Option<Duration> {
        match self.recurrence {
            Recurrence::Periodic(period) => Some(period),
            Recurrence::Once => None,
        }
    }

    /// Whether the spec recurs.
    pub fn is_periodic(&self) -> bool {
        matches!(self.recurrence, Recurrence::Periodic(_))
    }

    /// Check the construction rules.
    ///
    /// A periodic spec must have a non-zero period. Negative periods
    /// and delays are unrepresentable in [`Duration`], so this is the
    /// whole rule set.
    pub fn validate(&self) -> Result<(), SpecError> {
        if let Recurrence::Periodic(period) = self.recurrence {
            if period.is_zero() {
                return Err(SpecError::InvalidSpec(
                    "period must be greater than zero".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_spec_defaults() {
        let spec = JobSpec::new(Duration::from_secs(60));
        assert_eq!(spec.name, "job");
        assert_eq!(spec.period(), Some(Duration::from_secs(60)));
        assert_eq!(spec.initial_delay, Duration::ZERO);
        assert!(!spec.requires_constraint);
        assert!(spec.is_periodic());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_one_shot_spec() {
        let spec = JobSpec::one_shot();
        assert_eq!(spec.period(), None);
        assert!(!spec.is_periodic());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_spec_builders() {
        let spec = JobSpec::new(Duration::from_secs(60))
            .with_name("refresh_token")
            .with_initial_delay(Duration::from_secs(5))
            .with_required_constraint();

        assert_eq!(spec.name, "refresh_token");
        assert_eq!(spec.initial_delay, Duration::from_secs(5));
        assert!(spec.requires_constraint);
    }

    #[test]
    fn test_zero_period_is_invalid() {
        let spec = JobSpec::new(Duration::ZERO);
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("period"));
    }

    #[test]
    fn test_job_id_unique_and_displayable() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }

    #[test]
    fn test_spec_serialization() {
        let spec = JobSpec::new(Duration::from_secs(14_400)).with_required_constraint();
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: JobSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }
}
