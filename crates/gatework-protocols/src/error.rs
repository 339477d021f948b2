//! Error types shared across the gatework crates.

use thiserror::Error;

/// Errors from job spec validation.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The spec violates a construction rule.
    #[error("invalid job spec: {0}")]
    InvalidSpec(String),
}

/// Errors from token store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem failure underneath a store.
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// Store contents could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from one job action execution.
///
/// Every variant is treated as transient by the scheduler: the failed
/// window stays armed and a redelivered signal re-attempts the fire.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The token store was unavailable for a read or write.
    #[error("token store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Any other action failure.
    #[error("action failed: {0}")]
    Failed(String),
}

/// Errors from a signal bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The bus is shut down and no longer accepts registrations.
    #[error("signal bus is shut down")]
    ShutDown,

    /// A signal channel was closed underneath the bus.
    #[error("signal channel closed for job {0}")]
    ChannelClosed(String),
}
