//! Error types for the scheduler.

use thiserror::Error;

use gatework_protocols::{BusError, SpecError};

/// Errors from scheduler registration and control.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The job spec failed validation. Fatal for that spec; nothing
    /// was registered.
    #[error("{0}")]
    InvalidSpec(#[from] SpecError),

    /// The signal bus rejected the registration.
    #[error("signal bus error: {0}")]
    Bus(#[from] BusError),
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
