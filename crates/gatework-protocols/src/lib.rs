//! # Gatework Protocols
//!
//! Shared contracts for the gatework constraint-gated job scheduler.
//!
//! This crate defines the seams the rest of the workspace plugs into:
//!
//! - [`JobSpec`]: immutable description of a schedulable job
//! - [`SignalBus`]: source of condition signals for registered jobs
//! - [`TokenStore`]: key-value storage the demo action refreshes
//! - [`JobAction`]: the unit of work a scheduler fires
//!
//! Implementations live in the sibling crates (`gatework-driver`,
//! `gatework-store`, `gatework-scheduler`); nothing here spawns tasks
//! or touches the clock.

pub mod action;
pub mod error;
pub mod job;
pub mod signal;
pub mod store;

// Re-exports
pub use action::JobAction;
pub use error::{ActionError, BusError, SpecError, StoreError};
pub use job::{JobId, JobSpec, Recurrence};
pub use signal::{JobRegistration, SignalBus, SignalEnvelope, SignalKind};
pub use store::TokenStore;
