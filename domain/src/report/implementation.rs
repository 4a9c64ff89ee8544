//! The ImplementationReport: output of the implementation stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall status of an implementation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplStatus {
    Success,
    Partial,
    Failed,
}

impl ImplStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ImplStatus::Success => "success",
            ImplStatus::Partial => "partial",
            ImplStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Some(ImplStatus::Success),
            "partial" => Some(ImplStatus::Partial),
            "failed" | "failure" => Some(ImplStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImplStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One issue reported by the linter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintIssue {
    pub line: u32,
    pub severity: String,
    pub message: String,
}

impl LintIssue {
    pub fn new(line: u32, severity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: severity.into(),
            message: message.into(),
        }
    }
}

/// Lint outcome for a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintOutcome {
    /// Linter score out of 10
    pub score: f64,
    /// Whether the file parsed without syntax errors
    pub syntax_valid: bool,
    /// Issues found, in the order the linter reported them
    pub issues: Vec<LintIssue>,
}

impl LintOutcome {
    pub fn clean(score: f64) -> Self {
        Self {
            score,
            syntax_valid: true,
            issues: Vec::new(),
        }
    }

    pub fn with_issue(mut self, issue: LintIssue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Whether this outcome blocks a `success` status under the given
    /// score threshold.
    pub fn is_blocking(&self, threshold: f64) -> bool {
        !self.syntax_valid || self.score < threshold
    }
}

/// Structured output of the implementation stage.
///
/// Invariant: `status == Success` implies every listed file has a lint
/// outcome that is non-blocking under the configured threshold
/// (default 8.0). Checked via [`check_invariants`](Self::check_invariants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationReport {
    pub status: ImplStatus,
    /// File paths that were created
    pub files_created: Vec<String>,
    /// File paths that were modified
    pub files_modified: Vec<String>,
    /// Lint outcome per file path (deterministically ordered)
    pub lint_results: BTreeMap<String, LintOutcome>,
    /// Brief summary of what was implemented
    pub summary: String,
    /// Problems or deviations from the plan
    pub issues_encountered: Vec<String>,
}

impl ImplementationReport {
    pub fn new(status: ImplStatus, summary: impl Into<String>) -> Self {
        Self {
            status,
            files_created: Vec::new(),
            files_modified: Vec::new(),
            lint_results: BTreeMap::new(),
            summary: summary.into(),
            issues_encountered: Vec::new(),
        }
    }

    /// A failed report carrying only an explanation, used when the stage
    /// itself failed before producing anything.
    pub fn failed(summary: impl Into<String>) -> Self {
        Self::new(ImplStatus::Failed, summary)
    }

    pub fn with_created(mut self, path: impl Into<String>) -> Self {
        self.files_created.push(path.into());
        self
    }

    pub fn with_modified(mut self, path: impl Into<String>) -> Self {
        self.files_modified.push(path.into());
        self
    }

    pub fn with_lint(mut self, path: impl Into<String>, outcome: LintOutcome) -> Self {
        self.lint_results.insert(path.into(), outcome);
        self
    }

    /// All files this report claims to have touched.
    pub fn listed_files(&self) -> impl Iterator<Item = &str> {
        self.files_created
            .iter()
            .chain(self.files_modified.iter())
            .map(|s| s.as_str())
    }

    /// Whether every listed file has a non-blocking lint outcome.
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.listed_files().all(|path| {
            self.lint_results
                .get(path)
                .map(|o| !o.is_blocking(threshold))
                .unwrap_or(false)
        })
    }

    /// Check the success invariant, returning violation descriptions.
    pub fn check_invariants(&self, threshold: f64) -> Vec<String> {
        let mut violations = Vec::new();
        if self.status != ImplStatus::Success {
            return violations;
        }
        for path in self.listed_files() {
            match self.lint_results.get(path) {
                None => violations.push(format!(
                    "status is success but '{}' has no lint outcome",
                    path
                )),
                Some(outcome) if outcome.is_blocking(threshold) => violations.push(format!(
                    "status is success but '{}' scores {:.1} (threshold {:.1})",
                    path, outcome.score, threshold
                )),
                Some(_) => {}
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(ImplStatus::parse("Success"), Some(ImplStatus::Success));
        assert_eq!(ImplStatus::parse("partial"), Some(ImplStatus::Partial));
        assert_eq!(ImplStatus::parse("failure"), Some(ImplStatus::Failed));
        assert_eq!(ImplStatus::parse("done"), None);
    }

    #[test]
    fn test_success_invariant_holds_with_clean_lint() {
        let report = ImplementationReport::new(ImplStatus::Success, "done")
            .with_created("hello.py")
            .with_lint("hello.py", LintOutcome::clean(10.0));
        assert!(report.check_invariants(8.0).is_empty());
        assert!(report.meets_threshold(8.0));
    }

    #[test]
    fn test_success_invariant_violated_below_threshold() {
        let report = ImplementationReport::new(ImplStatus::Success, "done")
            .with_created("hello.py")
            .with_lint("hello.py", LintOutcome::clean(6.5));
        let violations = report.check_invariants(8.0);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("6.5"));
    }

    #[test]
    fn test_success_invariant_violated_missing_outcome() {
        let report =
            ImplementationReport::new(ImplStatus::Success, "done").with_created("hello.py");
        assert!(!report.meets_threshold(8.0));
        assert_eq!(report.check_invariants(8.0).len(), 1);
    }

    #[test]
    fn test_syntax_error_is_blocking_regardless_of_score() {
        let outcome = LintOutcome {
            score: 10.0,
            syntax_valid: false,
            issues: vec![LintIssue::new(3, "error", "invalid syntax")],
        };
        assert!(outcome.is_blocking(8.0));
    }

    #[test]
    fn test_non_success_status_never_violates() {
        let report = ImplementationReport::failed("could not write file");
        assert!(report.check_invariants(8.0).is_empty());
    }
}
