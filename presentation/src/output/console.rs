//! Console formatting of pipeline outcomes.

use colored::Colorize;
use triad_domain::{ImplementationReport, PipelineOutcome, Plan, RunStatus, ValidationReport};

/// How many list entries to show before eliding the rest
const PREVIEW_LIMIT: usize = 5;

/// Formats pipeline results for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Full human-readable rendering of an outcome.
    pub fn format(outcome: &PipelineOutcome) -> String {
        let mut out = Vec::new();

        let status = match outcome.status {
            RunStatus::Approved => "APPROVED".green().bold().to_string(),
            RunStatus::NeedsReview => "NEEDS REVIEW".yellow().bold().to_string(),
        };
        out.push(format!("Status: {}", status));
        out.push(format!("Fix iterations: {}", outcome.fix_iterations));
        out.push(String::new());

        out.push(Self::format_plan(&outcome.plan));
        out.push(String::new());
        out.push(Self::format_implementation(&outcome.implementation));
        out.push(String::new());
        out.push(Self::format_validation(&outcome.validation));

        out.join("\n")
    }

    /// JSON rendering of an outcome.
    pub fn format_json(outcome: &PipelineOutcome) -> String {
        serde_json::to_string_pretty(outcome)
            .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize outcome: {}\"}}", e))
    }

    fn preview(items: impl Iterator<Item = String>, out: &mut Vec<String>, total: usize) {
        for item in items.take(PREVIEW_LIMIT) {
            out.push(item);
        }
        if total > PREVIEW_LIMIT {
            out.push(format!("  ... and {} more", total - PREVIEW_LIMIT));
        }
    }

    fn format_plan(plan: &Plan) -> String {
        let mut out = vec!["== Plan ==".bold().to_string()];
        out.push(format!("Analysis: {}", plan.analysis));
        if !plan.context.is_empty() {
            out.push(format!("Context: {}", plan.context));
        }

        if !plan.files_to_create.is_empty() {
            out.push(format!("Files to create: {}", plan.files_to_create.len()));
            Self::preview(
                plan.files_to_create
                    .iter()
                    .map(|f| format!("  + {}: {}", f.path, f.purpose)),
                &mut out,
                plan.files_to_create.len(),
            );
        }
        if !plan.files_to_modify.is_empty() {
            out.push(format!("Files to modify: {}", plan.files_to_modify.len()));
            Self::preview(
                plan.files_to_modify
                    .iter()
                    .map(|f| format!("  ~ {}: {}", f.path, f.purpose)),
                &mut out,
                plan.files_to_modify.len(),
            );
        }
        if !plan.steps.is_empty() {
            out.push(format!("Steps: {}", plan.steps.len()));
        }
        if !plan.considerations.is_empty() {
            out.push(format!("Considerations: {}", plan.considerations.len()));
            Self::preview(
                plan.considerations.iter().map(|c| format!("  - {}", c)),
                &mut out,
                plan.considerations.len(),
            );
        }
        out.join("\n")
    }

    fn format_implementation(report: &ImplementationReport) -> String {
        let mut out = vec!["== Implementation ==".bold().to_string()];
        out.push(format!("Status: {}", report.status));

        if !report.files_created.is_empty() {
            out.push(format!("Created: {}", report.files_created.join(", ")));
        }
        if !report.files_modified.is_empty() {
            out.push(format!("Modified: {}", report.files_modified.join(", ")));
        }
        if !report.lint_results.is_empty() {
            out.push("Lint scores:".to_string());
            for (path, outcome) in report.lint_results.iter().take(PREVIEW_LIMIT) {
                let syntax = if outcome.syntax_valid { "" } else { " [SYNTAX ERROR]" };
                let issues = if outcome.issues.is_empty() {
                    String::new()
                } else {
                    format!(" ({} issues)", outcome.issues.len())
                };
                out.push(format!(
                    "  {}: {:.1}/10{}{}",
                    path, outcome.score, syntax, issues
                ));
            }
        }
        if !report.summary.is_empty() {
            out.push(format!("Summary: {}", report.summary));
        }
        if !report.issues_encountered.is_empty() {
            out.push(format!("Issues: {}", report.issues_encountered.len()));
            Self::preview(
                report.issues_encountered.iter().map(|i| format!("  - {}", i)),
                &mut out,
                report.issues_encountered.len(),
            );
        }
        out.join("\n")
    }

    fn format_validation(report: &ValidationReport) -> String {
        let mut out = vec!["== Validation ==".bold().to_string()];
        let verdict = if report.approval {
            "approved".green().to_string()
        } else {
            "needs fixes".red().to_string()
        };
        out.push(format!("Verdict: {}", verdict));
        out.push(format!("Quality score: {:.1}/10", report.quality_score));

        if !report.changes_summary.is_empty() {
            out.push(format!("Changes: {}", report.changes_summary));
        }
        if !report.files_reviewed.is_empty() {
            out.push(format!("Reviewed: {}", report.files_reviewed.join(", ")));
        }
        if !report.issues.is_empty() {
            out.push(format!("Issues: {}", report.issues.len()));
            Self::preview(
                report.issues.iter().map(|i| {
                    let mut line = format!("  - {}", i.description);
                    if let Some(fix) = &i.fix_instruction {
                        line.push_str(&format!(" (fix: {})", fix));
                    }
                    line
                }),
                &mut out,
                report.issues.len(),
            );
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triad_domain::{FileIntent, ImplStatus, LintOutcome, RunStatus, ValidationIssue};

    fn outcome() -> PipelineOutcome {
        let plan = Plan::new("Create hello.py", "Empty project")
            .with_creation(FileIntent::new("hello.py", "prints a greeting"));
        let implementation = ImplementationReport::new(ImplStatus::Success, "Created hello.py")
            .with_created("hello.py")
            .with_lint("hello.py", LintOutcome::clean(10.0));
        let validation = ValidationReport::approved("hello.py added", 9.5);
        PipelineOutcome {
            plan,
            implementation,
            validation,
            status: RunStatus::Approved,
            fix_iterations: 0,
        }
    }

    #[test]
    fn test_format_contains_all_sections() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&outcome());
        assert!(text.contains("Status: APPROVED"));
        assert!(text.contains("== Plan =="));
        assert!(text.contains("hello.py: prints a greeting"));
        assert!(text.contains("== Implementation =="));
        assert!(text.contains("hello.py: 10.0/10"));
        assert!(text.contains("== Validation =="));
        assert!(text.contains("Quality score: 9.5/10"));
    }

    #[test]
    fn test_format_needs_review() {
        colored::control::set_override(false);
        let mut o = outcome();
        o.status = RunStatus::NeedsReview;
        o.validation = ValidationReport::needs_fixes(
            "problems remain",
            4.0,
            vec![ValidationIssue::new("missing docstring").with_fix("add one")],
        );
        let text = ConsoleFormatter::format(&o);
        assert!(text.contains("NEEDS REVIEW"));
        assert!(text.contains("missing docstring"));
        assert!(text.contains("(fix: add one)"));
    }

    #[test]
    fn test_format_json_roundtrips() {
        let json = ConsoleFormatter::format_json(&outcome());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "approved");
        assert_eq!(value["plan"]["analysis"], "Create hello.py");
    }
}
