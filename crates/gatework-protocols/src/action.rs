//! Job action contract.

use async_trait::async_trait;

use crate::error::ActionError;

/// The unit of work a scheduler fires once per eligible window.
///
/// Implementations must be idempotent: signal delivery is
/// at-least-once, and a failed fire is re-attempted when the next
/// signal arrives, so an action can run again with the same inputs.
#[async_trait]
pub trait JobAction: Send + Sync {
    /// Execute one fire.
    async fn execute(&self) -> Result<(), ActionError>;
}
