//! Readiness flags behind the eligibility gate.

use gatework_protocols::{JobSpec, SignalKind};

/// Fold of the condition signals a job has seen.
///
/// `delay_elapsed` and `constraint_met` are level conditions: once set
/// they stay set. `period_elapsed` is consumed by each successful
/// fire, which is what makes a fire happen at most once per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessState {
    delay_elapsed: bool,
    period_elapsed: bool,
    constraint_met: bool,
    periodic: bool,
}

impl ReadinessState {
    /// Initial readiness for a spec.
    ///
    /// A zero initial delay pre-opens the delay gate; a spec without a
    /// required constraint pre-opens the constraint gate.
    pub fn for_spec(spec: &JobSpec) -> Self {
        Self {
            delay_elapsed: spec.initial_delay.is_zero(),
            period_elapsed: false,
            constraint_met: !spec.requires_constraint,
            periodic: spec.is_periodic(),
        }
    }

    /// Fold one signal into the flags.
    ///
    /// Returns `true` when a flag actually flipped; duplicates and
    /// already-open gates return `false`.
    pub fn apply(&mut self, kind: SignalKind) -> bool {
        let flag = match kind {
            SignalKind::DelayElapsed => &mut self.delay_elapsed,
            SignalKind::PeriodElapsed => &mut self.period_elapsed,
            SignalKind::ConstraintMet => &mut self.constraint_met,
        };
        let flipped = !*flag;
        *flag = true;
        flipped
    }

    /// Whether every gate for a fire currently holds.
    ///
    /// One-shot jobs have no period gate.
    pub fn eligible(&self) -> bool {
        let period_gate = !self.periodic || self.period_elapsed;
        self.delay_elapsed && period_gate && self.constraint_met
    }

    /// Consume the window after a successful fire.
    ///
    /// Only the period gate closes: the delay gate covers the first
    /// window only, and constraints hold until revoked.
    pub fn consume_window(&mut self) {
        self.period_elapsed = false;
    }

    /// Delay gate state.
    pub fn delay_elapsed(&self) -> bool {
        self.delay_elapsed
    }

    /// Period gate state.
    pub fn period_elapsed(&self) -> bool {
        self.period_elapsed
    }

    /// Constraint gate state.
    pub fn constraint_met(&self) -> bool {
        self.constraint_met
    }
}
