//! Job lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a scheduled job.
///
/// Stored as a `u8` in an atomic so handles can read it without
/// touching the scheduler task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum JobState {
    /// Registered, waiting for the initial delay.
    Idle = 0,
    /// Delay gate open, waiting for the window and constraints.
    AwaitingPeriod = 1,
    /// Every gate holds; a fire is starting or being retried.
    Ready = 2,
    /// The action is executing.
    Firing = 3,
    /// One-shot job fired successfully. Terminal.
    Completed = 4,
    /// Explicitly cancelled. Terminal.
    Cancelled = 5,
}

impl JobState {
    /// Whether the job can never fire again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Cancelled)
    }
}

impl From<u8> for JobState {
    fn from(v: u8) -> Self {
        match v {
            0 => JobState::Idle,
            1 => JobState::AwaitingPeriod,
            2 => JobState::Ready,
            3 => JobState::Firing,
            4 => JobState::Completed,
            5 => JobState::Cancelled,
            _ => JobState::Idle,
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Idle => write!(f, "idle"),
            JobState::AwaitingPeriod => write!(f, "awaiting_period"),
            JobState::Ready => write!(f, "ready"),
            JobState::Firing => write!(f, "firing"),
            JobState::Completed => write!(f, "completed"),
            JobState::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_u8() {
        assert_eq!(JobState::from(0), JobState::Idle);
        assert_eq!(JobState::from(1), JobState::AwaitingPeriod);
        assert_eq!(JobState::from(2), JobState::Ready);
        assert_eq!(JobState::from(3), JobState::Firing);
        assert_eq!(JobState::from(4), JobState::Completed);
        assert_eq!(JobState::from(5), JobState::Cancelled);
        assert_eq!(JobState::from(99), JobState::Idle);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(JobState::AwaitingPeriod.to_string(), "awaiting_period");
        assert_eq!(JobState::Firing.to_string(), "firing");
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
        assert!(!JobState::Idle.is_terminal());
        assert!(!JobState::AwaitingPeriod.is_terminal());
        assert!(!JobState::Ready.is_terminal());
        assert!(!JobState::Firing.is_terminal());
    }
}
