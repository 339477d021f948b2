//! # Gatework Driver
//!
//! [`SignalBus`](gatework_protocols::SignalBus) implementations that
//! feed condition signals to schedulers:
//!
//! - [`ManualSignalDriver`]: signals fire only when told to. The test
//!   mode bus: deterministic, no clock involved.
//! - [`IntervalSignalDriver`]: wall-clock driver. Per job it emits
//!   `DelayElapsed` after the initial delay, `PeriodElapsed` every
//!   period, and `ConstraintMet` while a [`ConstraintProbe`] reports
//!   the constraint satisfied.
//!
//! Both drivers deliver at-least-once over bounded per-job channels
//! and never drop a signal: senders wait for capacity.

pub mod config;
pub mod interval;
pub mod manual;
pub mod probe;

// Re-exports
pub use config::DriverConfig;
pub use interval::IntervalSignalDriver;
pub use manual::ManualSignalDriver;
pub use probe::{ConstraintProbe, PathProbe, StaticProbe};

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
