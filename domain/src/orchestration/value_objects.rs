//! Aggregated pipeline outcome.

use crate::report::implementation::ImplementationReport;
use crate::report::plan::Plan;
use crate::report::validation::ValidationReport;
use serde::{Deserialize, Serialize};

/// Final status of a pipeline run.
///
/// `NeedsReview` is a completed run, not an error: the result is flagged as
/// unresolved for a human to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Approved,
    NeedsReview,
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Approved => "approved",
            RunStatus::NeedsReview => "needs_review",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The aggregated result of a pipeline run.
///
/// Always carries whatever partial artifacts were produced, even when the
/// run ends as `needs_review`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// The execution plan from the planning stage
    pub plan: Plan,
    /// The last implementation report
    pub implementation: ImplementationReport,
    /// The last validation report
    pub validation: ValidationReport,
    /// Overall status
    pub status: RunStatus,
    /// Number of fix iterations performed
    pub fix_iterations: usize,
}

impl PipelineOutcome {
    pub fn is_approved(&self) -> bool {
        self.status == RunStatus::Approved
    }
}
