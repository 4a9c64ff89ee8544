//! Coercion of raw LLM text into stage reports.
//!
//! Extracts structured reports from stage output: fenced ```json blocks,
//! raw JSON, or JSON embedded in prose. Required list-valued fields that are
//! absent are filled with typed empty defaults; coercion fails only when a
//! scalar field (status/approval) is unrecoverable.
//!
//! "Parses to schema" vs "fails" is an explicit two-state [`Result`], not an
//! exception escaping into the orchestrator.

use super::implementation::{ImplStatus, ImplementationReport, LintIssue, LintOutcome};
use super::plan::{FileIntent, Plan, PlanStep, StepAction};
use super::validation::{ValidationIssue, ValidationReport, ValidationStatus};
use crate::core::string::truncate;
use thiserror::Error;

/// Raised when stage output cannot be coerced into its declared schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{report} output did not match the expected schema: {reason}")]
pub struct SchemaViolation {
    pub report: &'static str,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(report: &'static str, reason: impl Into<String>) -> Self {
        Self {
            report,
            reason: reason.into(),
        }
    }
}

/// A report type that can be coerced from loose LLM output.
pub trait StageReport: Sized {
    /// Human-readable name used in prompts and diagnostics.
    const NAME: &'static str;

    /// Build the report from a parsed JSON value.
    fn from_json(value: &serde_json::Value) -> Result<Self, SchemaViolation>;

    /// Best-effort fallback wrapping the raw text, used after the retry
    /// budget is spent so the pipeline never hard-fails on malformed output.
    fn fallback(raw: &str) -> Self;
}

/// Pull a JSON value out of stage output.
///
/// Tried in order: fenced ```json blocks (last one wins: the final answer
/// supersedes earlier drafts), any fenced block that parses, the whole text,
/// and finally the outermost `{...}` span.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    let mut candidate = None;
    let mut in_fence = false;
    let mut block = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if !in_fence && (trimmed == "```json" || trimmed == "```") {
            in_fence = true;
            block.clear();
        } else if in_fence && trimmed == "```" {
            in_fence = false;
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&block) {
                if value.is_object() {
                    candidate = Some(value);
                }
            }
        } else if in_fence {
            block.push_str(line);
            block.push('\n');
        }
    }
    if candidate.is_some() {
        return candidate;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text.trim()) {
        if value.is_object() {
            return Some(value);
        }
    }

    // JSON embedded in prose: outermost object span
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text[start..=end]) {
            if value.is_object() {
                return Some(value);
            }
        }
    }
    None
}

/// Coerce stage output text into a report.
pub fn coerce<T: StageReport>(text: &str) -> Result<T, SchemaViolation> {
    let value = extract_json(text)
        .ok_or_else(|| SchemaViolation::new(T::NAME, "no JSON object found in output"))?;
    T::from_json(&value)
}

// ---------------------------------------------------------------------------
// Lenient field accessors
// ---------------------------------------------------------------------------

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    match value.get(key) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(value: &serde_json::Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn number_field(value: &serde_json::Value, key: &str) -> Option<f64> {
    match value.get(key) {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().trim_end_matches("/10").parse().ok(),
        _ => None,
    }
}

fn intent_list(value: &serde_json::Value, key: &str) -> Vec<FileIntent> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let path = str_field(item, "path")?;
                    let purpose = str_field(item, "purpose").unwrap_or_default();
                    Some(FileIntent::new(path, purpose))
                })
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

impl StageReport for Plan {
    const NAME: &'static str = "Plan";

    fn from_json(value: &serde_json::Value) -> Result<Self, SchemaViolation> {
        let analysis = str_field(value, "analysis")
            .ok_or_else(|| SchemaViolation::new(Self::NAME, "missing 'analysis'"))?;
        let context = str_field(value, "context").unwrap_or_default();

        let mut plan = Plan::new(analysis, context);
        plan.files_to_create = intent_list(value, "files_to_create");
        plan.files_to_modify = intent_list(value, "files_to_modify");
        plan.considerations = string_list(value, "considerations");

        if let Some(steps) = value.get("steps").and_then(|v| v.as_array()) {
            for (index, step) in steps.iter().enumerate() {
                let sequence = step
                    .get("sequence")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(index as u64 + 1) as u32;
                let action = str_field(step, "action")
                    .and_then(|s| StepAction::parse(&s))
                    .unwrap_or(StepAction::Create);
                let file = match str_field(step, "file") {
                    Some(f) => f,
                    None => continue, // a step without a target is noise
                };
                let description = str_field(step, "description").unwrap_or_default();
                plan.steps.push(PlanStep::new(sequence, action, file, description));
            }
        }

        Ok(plan)
    }

    fn fallback(raw: &str) -> Self {
        Plan::new(
            "Failed to extract a structured plan from the planner output",
            truncate(raw, 500),
        )
    }
}

// ---------------------------------------------------------------------------
// ImplementationReport
// ---------------------------------------------------------------------------

fn lint_outcome_from_json(value: &serde_json::Value) -> LintOutcome {
    let score = number_field(value, "score").unwrap_or(0.0);
    let syntax_valid = value
        .get("syntax_valid")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    let mut outcome = LintOutcome {
        score,
        syntax_valid,
        issues: Vec::new(),
    };
    if let Some(issues) = value.get("issues").and_then(|v| v.as_array()) {
        for issue in issues {
            match issue {
                serde_json::Value::String(s) => {
                    outcome.issues.push(LintIssue::new(0, "warning", s));
                }
                other => {
                    let line = other.get("line").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
                    let severity =
                        str_field(other, "severity").unwrap_or_else(|| "warning".to_string());
                    let message = str_field(other, "message").unwrap_or_default();
                    outcome.issues.push(LintIssue::new(line, severity, message));
                }
            }
        }
    }
    outcome
}

impl StageReport for ImplementationReport {
    const NAME: &'static str = "ImplementationReport";

    fn from_json(value: &serde_json::Value) -> Result<Self, SchemaViolation> {
        let status = str_field(value, "status")
            .and_then(|s| ImplStatus::parse(&s))
            .ok_or_else(|| SchemaViolation::new(Self::NAME, "missing or invalid 'status'"))?;

        let summary = str_field(value, "summary").unwrap_or_default();
        let mut report = ImplementationReport::new(status, summary);
        report.files_created = string_list(value, "files_created");
        report.files_modified = string_list(value, "files_modified");
        report.issues_encountered = string_list(value, "issues_encountered");

        let lint_key = ["lint_results", "linting_results"]
            .into_iter()
            .find(|k| value.get(*k).is_some());
        if let Some(key) = lint_key {
            if let Some(map) = value.get(key).and_then(|v| v.as_object()) {
                for (path, outcome) in map {
                    report
                        .lint_results
                        .insert(path.clone(), lint_outcome_from_json(outcome));
                }
            }
        }

        Ok(report)
    }

    fn fallback(raw: &str) -> Self {
        ImplementationReport::failed(format!(
            "Failed to extract a structured report from the implementer output: {}",
            truncate(raw, 500)
        ))
    }
}

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

fn quality_score_from_json(value: &serde_json::Value) -> f64 {
    if let Some(score) = number_field(value, "quality_score") {
        return score;
    }
    // The validator sometimes rates quality with a word instead of a number
    match str_field(value, "overall_quality").as_deref() {
        Some("excellent") => 9.0,
        Some("good") => 7.5,
        Some("needs_improvement") => 4.0,
        _ => 0.0,
    }
}

impl StageReport for ValidationReport {
    const NAME: &'static str = "ValidationReport";

    fn from_json(value: &serde_json::Value) -> Result<Self, SchemaViolation> {
        let approval = value.get("approval").and_then(|v| v.as_bool());
        let status = str_field(value, "status").and_then(|s| ValidationStatus::parse(&s));

        let approval = match (approval, status) {
            (Some(flag), _) => flag,
            (None, Some(status)) => status == ValidationStatus::Approved,
            (None, None) => {
                return Err(SchemaViolation::new(
                    Self::NAME,
                    "missing both 'approval' and 'status'",
                ));
            }
        };

        let mut issues: Vec<ValidationIssue> = Vec::new();
        if let Some(items) = value
            .get("issues")
            .or_else(|| value.get("issues_found"))
            .and_then(|v| v.as_array())
        {
            for item in items {
                match item {
                    serde_json::Value::String(s) if !s.is_empty() => {
                        issues.push(ValidationIssue::new(s.clone()));
                    }
                    other => {
                        if let Some(description) = str_field(other, "description") {
                            let mut issue = ValidationIssue::new(description);
                            if let Some(fix) = str_field(other, "fix_instruction")
                                .or_else(|| str_field(other, "fix"))
                            {
                                issue = issue.with_fix(fix);
                            }
                            issues.push(issue);
                        }
                    }
                }
            }
        }
        // Standalone fix instructions pair with issues positionally; extras
        // become issues of their own so no instruction is dropped.
        let instructions = string_list(value, "fix_instructions");
        for (index, instruction) in instructions.into_iter().enumerate() {
            match issues.get_mut(index) {
                Some(issue) if issue.fix_instruction.is_none() => {
                    issue.fix_instruction = Some(instruction);
                }
                Some(_) => {}
                None => {
                    issues.push(ValidationIssue::new(instruction.clone()).with_fix(instruction));
                }
            }
        }

        let report = ValidationReport {
            status: status.unwrap_or(ValidationStatus::NeedsFixes),
            changes_summary: str_field(value, "changes_summary").unwrap_or_default(),
            files_reviewed: string_list(value, "files_reviewed"),
            quality_score: quality_score_from_json(value),
            issues,
            approval,
        };
        Ok(report.normalized())
    }

    fn fallback(raw: &str) -> Self {
        ValidationReport::needs_fixes(
            format!(
                "Failed to extract a structured report from the validator output: {}",
                truncate(raw, 500)
            ),
            0.0,
            Vec::new(),
        )
    }
}
