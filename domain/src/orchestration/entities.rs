//! Pipeline state machine.
//!
//! States: `Planning → Implementing → Validating → (Approved | Fixing →
//! Implementing)`, with `NeedsReview` as the non-error terminal when the fix
//! budget is spent. There is no rollback of partial file changes on
//! exhaustion; the orchestrator reports, it never reverts.

use serde::{Deserialize, Serialize};

/// Phase of pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    /// Planning stage is producing the plan
    Planning,
    /// Implementation stage is executing the plan
    Implementing,
    /// Validator stage is reviewing the implementation
    Validating,
    /// Fix instructions are being fed back to the implementer
    Fixing,
    /// Terminal: the validator approved
    Approved,
    /// Terminal: the fix budget is exhausted without approval
    NeedsReview,
}

impl PipelinePhase {
    pub fn as_str(&self) -> &str {
        match self {
            PipelinePhase::Planning => "planning",
            PipelinePhase::Implementing => "implementing",
            PipelinePhase::Validating => "validating",
            PipelinePhase::Fixing => "fixing",
            PipelinePhase::Approved => "approved",
            PipelinePhase::NeedsReview => "needs_review",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            PipelinePhase::Planning => "Planning",
            PipelinePhase::Implementing => "Implementing",
            PipelinePhase::Validating => "Validating",
            PipelinePhase::Fixing => "Fixing",
            PipelinePhase::Approved => "Approved",
            PipelinePhase::NeedsReview => "Needs Review",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelinePhase::Approved | PipelinePhase::NeedsReview)
    }
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// State of a pipeline run (Entity).
///
/// The fix-loop iteration counter lives here and is owned exclusively by
/// the orchestrator; stages never touch it.
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Current phase
    pub phase: PipelinePhase,
    /// Fix iterations performed so far
    pub fix_iterations: usize,
    /// Fix iteration budget
    pub max_fix_iterations: usize,
}

impl PipelineState {
    pub fn new(max_fix_iterations: usize) -> Self {
        Self {
            phase: PipelinePhase::Planning,
            fix_iterations: 0,
            max_fix_iterations,
        }
    }

    pub fn set_phase(&mut self, phase: PipelinePhase) {
        self.phase = phase;
    }

    /// Whether another fix iteration is allowed.
    pub fn can_fix(&self) -> bool {
        self.fix_iterations < self.max_fix_iterations
    }

    /// Claim one fix iteration. Returns `false` when the budget is spent,
    /// leaving the counter untouched.
    pub fn start_fix_iteration(&mut self) -> bool {
        if !self.can_fix() {
            return false;
        }
        self.fix_iterations += 1;
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PipelineState::new(3);
        assert_eq!(state.phase, PipelinePhase::Planning);
        assert_eq!(state.fix_iterations, 0);
        assert!(state.can_fix());
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_fix_budget_allows_exactly_max_iterations() {
        let mut state = PipelineState::new(3);
        assert!(state.start_fix_iteration()); // 1
        assert!(state.start_fix_iteration()); // 2
        assert!(state.start_fix_iteration()); // 3
        assert!(!state.start_fix_iteration()); // budget spent
        assert_eq!(state.fix_iterations, 3);
    }

    #[test]
    fn test_zero_budget_never_fixes() {
        let mut state = PipelineState::new(0);
        assert!(!state.can_fix());
        assert!(!state.start_fix_iteration());
        assert_eq!(state.fix_iterations, 0);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(PipelinePhase::Approved.is_terminal());
        assert!(PipelinePhase::NeedsReview.is_terminal());
        assert!(!PipelinePhase::Fixing.is_terminal());
        assert!(!PipelinePhase::Validating.is_terminal());
    }
}
