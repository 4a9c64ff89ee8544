//! The ValidationReport: output of the validator stage and the input to
//! the orchestrator's fix-loop decision.

use crate::core::string::truncate;
use serde::{Deserialize, Serialize};

/// Validation verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Approved,
    NeedsFixes,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ValidationStatus::Approved => "approved",
            ValidationStatus::NeedsFixes => "needs_fixes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "approved" | "approve" => Some(ValidationStatus::Approved),
            "needs_fixes" | "rejected" => Some(ValidationStatus::NeedsFixes),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One issue found during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// What is wrong, ideally with file name and line number
    pub description: String,
    /// How to fix it, when the validator provided instructions
    pub fix_instruction: Option<String>,
}

impl ValidationIssue {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            fix_instruction: None,
        }
    }

    pub fn with_fix(mut self, instruction: impl Into<String>) -> Self {
        self.fix_instruction = Some(instruction.into());
        self
    }
}

/// Structured output of the validator stage.
///
/// Invariant: `approval == (status == Approved)` and an approved report has
/// no blocking issues. [`normalized`](Self::normalized) enforces this; when
/// the producing LLM emits contradictory fields the boolean approval flag
/// wins and leftover issues are folded into the changes summary as advisory
/// notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    /// What changed, based on the diff review
    pub changes_summary: String,
    /// Files the validator looked at
    pub files_reviewed: Vec<String>,
    /// Overall quality score out of 10
    pub quality_score: f64,
    /// Issues found, ordered by priority
    pub issues: Vec<ValidationIssue>,
    /// Whether the implementation is approved
    pub approval: bool,
}

impl ValidationReport {
    pub fn approved(changes_summary: impl Into<String>, quality_score: f64) -> Self {
        Self {
            status: ValidationStatus::Approved,
            changes_summary: changes_summary.into(),
            files_reviewed: Vec::new(),
            quality_score,
            issues: Vec::new(),
            approval: true,
        }
    }

    pub fn needs_fixes(
        changes_summary: impl Into<String>,
        quality_score: f64,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        Self {
            status: ValidationStatus::NeedsFixes,
            changes_summary: changes_summary.into(),
            files_reviewed: Vec::new(),
            quality_score,
            issues,
            approval: false,
        }
    }

    /// A rejecting report synthesized from a stage-level failure (timeout,
    /// gateway error, capability violation). Consumes one fix iteration
    /// like any other rejection.
    pub fn from_stage_failure(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::needs_fixes(
            format!("Stage failed before producing a review: {}", reason),
            0.0,
            vec![
                ValidationIssue::new(reason.clone())
                    .with_fix(format!("Retry the implementation; previous attempt failed: {}", truncate(&reason, 200))),
            ],
        )
    }

    pub fn with_reviewed(mut self, path: impl Into<String>) -> Self {
        self.files_reviewed.push(path.into());
        self
    }

    pub fn is_approved(&self) -> bool {
        self.approval
    }

    /// Enforce the consistency invariant. The approval flag wins.
    pub fn normalized(mut self) -> Self {
        self.status = if self.approval {
            ValidationStatus::Approved
        } else {
            ValidationStatus::NeedsFixes
        };
        if self.approval && !self.issues.is_empty() {
            let notes: Vec<String> = self.issues.drain(..).map(|i| i.description).collect();
            if !self.changes_summary.is_empty() {
                self.changes_summary.push('\n');
            }
            self.changes_summary
                .push_str(&format!("Advisory notes: {}", notes.join("; ")));
        }
        self
    }

    /// Extract the fix instructions for the next implementation round.
    ///
    /// Prefers explicit fix instructions, falls back to issue descriptions,
    /// and finally to a generic instruction so the fix round always has
    /// something actionable.
    pub fn fix_instructions(&self) -> Vec<String> {
        let explicit: Vec<String> = self
            .issues
            .iter()
            .filter_map(|i| i.fix_instruction.clone())
            .collect();
        if !explicit.is_empty() {
            return explicit;
        }
        let descriptions: Vec<String> = self
            .issues
            .iter()
            .map(|i| i.description.clone())
            .filter(|d| !d.is_empty())
            .collect();
        if !descriptions.is_empty() {
            return descriptions;
        }
        vec!["Address the validation issues".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_matches_status_after_normalize() {
        let report = ValidationReport {
            status: ValidationStatus::NeedsFixes,
            changes_summary: "looks fine".to_string(),
            files_reviewed: Vec::new(),
            quality_score: 9.0,
            issues: Vec::new(),
            approval: true,
        }
        .normalized();
        assert_eq!(report.status, ValidationStatus::Approved);
        assert!(report.is_approved());
    }

    #[test]
    fn test_approved_report_has_no_issues_after_normalize() {
        let report = ValidationReport {
            status: ValidationStatus::Approved,
            changes_summary: "added hello.py".to_string(),
            files_reviewed: Vec::new(),
            quality_score: 9.0,
            issues: vec![ValidationIssue::new("nit: rename variable")],
            approval: true,
        }
        .normalized();
        assert!(report.issues.is_empty());
        assert!(report.changes_summary.contains("Advisory notes"));
    }

    #[test]
    fn test_fix_instructions_prefer_explicit() {
        let report = ValidationReport::needs_fixes(
            "problems",
            4.0,
            vec![
                ValidationIssue::new("missing docstring").with_fix("add a module docstring"),
                ValidationIssue::new("unused import"),
            ],
        );
        assert_eq!(report.fix_instructions(), vec!["add a module docstring"]);
    }

    #[test]
    fn test_fix_instructions_fall_back_to_descriptions() {
        let report = ValidationReport::needs_fixes(
            "problems",
            4.0,
            vec![ValidationIssue::new("unused import on line 3")],
        );
        assert_eq!(report.fix_instructions(), vec!["unused import on line 3"]);
    }

    #[test]
    fn test_fix_instructions_generic_fallback() {
        let report = ValidationReport::needs_fixes("problems", 4.0, Vec::new());
        assert_eq!(
            report.fix_instructions(),
            vec!["Address the validation issues"]
        );
    }

    #[test]
    fn test_stage_failure_report_rejects() {
        let report = ValidationReport::from_stage_failure("stage timed out");
        assert!(!report.is_approved());
        assert_eq!(report.status, ValidationStatus::NeedsFixes);
        assert!(!report.fix_instructions().is_empty());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            ValidationStatus::parse("approved"),
            Some(ValidationStatus::Approved)
        );
        assert_eq!(
            ValidationStatus::parse("needs-fixes"),
            Some(ValidationStatus::NeedsFixes)
        );
        assert_eq!(ValidationStatus::parse("meh"), None);
    }
}
