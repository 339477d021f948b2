//! Constraint probes for the interval driver.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::fs;

/// Observes whether a job's external constraint currently holds.
///
/// Probes are level sensors, not event sources: the driver polls them
/// and turns sustained satisfaction into repeated `ConstraintMet`
/// deliveries.
#[async_trait]
pub trait ConstraintProbe: Send + Sync {
    /// Report whether the constraint is satisfied right now.
    async fn is_satisfied(&self) -> bool;
}

/// Probe with a fixed or externally toggled answer.
pub struct StaticProbe {
    satisfied: AtomicBool,
}

impl StaticProbe {
    /// Probe that always reports satisfied.
    pub fn satisfied() -> Self {
        Self {
            satisfied: AtomicBool::new(true),
        }
    }

    /// Probe that reports unsatisfied until toggled.
    pub fn unsatisfied() -> Self {
        Self {
            satisfied: AtomicBool::new(false),
        }
    }

    /// Toggle the answer.
    pub fn set(&self, satisfied: bool) {
        self.satisfied.store(satisfied, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConstraintProbe for StaticProbe {
    async fn is_satisfied(&self) -> bool {
        self.satisfied.load(Ordering::SeqCst)
    }
}

/// Probe satisfied while a filesystem path exists.
///
/// A tangible stand-in for conditions like network availability:
/// touch the file to open the gate, remove it to close it.
pub struct PathProbe {
    path: PathBuf,
}

impl PathProbe {
    /// Create a probe watching `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path the probe watches.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl ConstraintProbe for PathProbe {
    async fn is_satisfied(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }
}
