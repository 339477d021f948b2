//! # Gatework Scheduler
//!
//! The constraint-gated job scheduler core.
//!
//! A [`PeriodicJobScheduler`] owns one [`JobSpec`] and decides,
//! deterministically and exactly once per eligible window, when to run
//! the job's [`JobAction`]. It never looks at a clock: every timing and
//! constraint condition arrives as a signal from a
//! [`SignalBus`](gatework_protocols::SignalBus), and the scheduler
//! folds those signals into readiness flags.
//!
//! ## Eligibility
//!
//! A periodic job fires when all three gates hold:
//!
//! ```text
//! delay_elapsed AND period_elapsed AND constraint_met
//! ```
//!
//! `delay_elapsed` is sticky (the initial delay gates only the first
//! window), `period_elapsed` is consumed by each successful fire, and
//! `constraint_met` is level-triggered: once reported it persists
//! across windows. A one-shot job skips the period gate and completes
//! after its single fire.
//!
//! ## Lifecycle
//!
//! ```text
//!             DelayElapsed              eligible        success
//!   Idle ────────────────▶ AwaitingPeriod ───▶ Ready ───▶ Firing ──┐
//!    │                          ▲                ▲           │     │
//!    │ (zero initial delay)     └────────────────┼───────────┘     │
//!    └──────────────────────────┘            failure               │
//!                                                                  │
//!   Completed (one-shot success) / Cancelled (explicit) ◀──────────┘
//! ```
//!
//! All transitions run on a single spawned task per job, so there is
//! never more than one in-flight action and no flag is updated
//! concurrently. Tests drive the machine through the manual driver in
//! `gatework-driver` and synchronize with [`PeriodicJobScheduler::settle`].

pub mod config;
pub mod error;
pub mod metrics;
pub mod readiness;
pub mod refresh;
pub mod scheduler;
pub mod state;

// Re-exports
pub use config::SchedulerConfig;
pub use error::{SchedulerError, SchedulerResult};
pub use metrics::{SchedulerMetrics, SchedulerMetricsSnapshot};
pub use readiness::ReadinessState;
pub use refresh::{INITIAL_TOKEN, REFRESHED_TOKEN, RefreshTokenAction, TOKEN_KEY};
pub use scheduler::{JobStatus, PeriodicJobScheduler};
pub use state::JobState;

// Re-export the contract types callers need alongside the scheduler
pub use gatework_protocols::{ActionError, JobAction, JobId, JobSpec, Recurrence, SpecError};

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
