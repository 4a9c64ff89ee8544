//! The Plan report: output of the planning stage.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A file the plan intends to create or modify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIntent {
    /// File path, relative to the sandbox root
    pub path: String,
    /// What this file does / what changes are needed
    pub purpose: String,
}

impl FileIntent {
    pub fn new(path: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            purpose: purpose.into(),
        }
    }
}

/// Action kind of a plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Create,
    Modify,
}

impl StepAction {
    pub fn as_str(&self) -> &str {
        match self {
            StepAction::Create => "create",
            StepAction::Modify => "modify",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Some(StepAction::Create),
            "modify" => Some(StepAction::Modify),
            _ => None,
        }
    }
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single execution step within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Step number in execution order
    pub sequence: u32,
    /// Action to perform
    pub action: StepAction,
    /// File path to act on
    pub file: String,
    /// Detailed description of what to do
    pub description: String,
}

impl PlanStep {
    pub fn new(
        sequence: u32,
        action: StepAction,
        file: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            sequence,
            action,
            file: file.into(),
            description: description.into(),
        }
    }
}

/// Structured output of the planning stage.
///
/// Invariants (checked, not enforced: the producer is an LLM):
/// - step sequence numbers are unique and monotonically increasing
/// - every file referenced by a step appears in `files_to_create` or
///   `files_to_modify`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Summary of what needs to be done and why
    pub analysis: String,
    /// Key findings from codebase exploration
    pub context: String,
    /// Files that need to be created, in order
    pub files_to_create: Vec<FileIntent>,
    /// Files that need to be modified, in order
    pub files_to_modify: Vec<FileIntent>,
    /// Ordered execution steps
    pub steps: Vec<PlanStep>,
    /// Edge cases, dependencies, risks
    pub considerations: Vec<String>,
}

impl Plan {
    pub fn new(analysis: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            analysis: analysis.into(),
            context: context.into(),
            files_to_create: Vec::new(),
            files_to_modify: Vec::new(),
            steps: Vec::new(),
            considerations: Vec::new(),
        }
    }

    pub fn with_creation(mut self, intent: FileIntent) -> Self {
        self.files_to_create.push(intent);
        self
    }

    pub fn with_modification(mut self, intent: FileIntent) -> Self {
        self.files_to_modify.push(intent);
        self
    }

    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_consideration(mut self, note: impl Into<String>) -> Self {
        self.considerations.push(note.into());
        self
    }

    /// A plan with no executable steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check plan invariants, returning a description of each violation.
    ///
    /// An empty vec means the plan is well-formed.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let mut seen = HashSet::new();
        let mut last: Option<u32> = None;
        for step in &self.steps {
            if !seen.insert(step.sequence) {
                violations.push(format!("duplicate step sequence {}", step.sequence));
            }
            if let Some(prev) = last {
                if step.sequence <= prev {
                    violations.push(format!(
                        "step sequence {} is not increasing (previous was {})",
                        step.sequence, prev
                    ));
                }
            }
            last = Some(step.sequence);
        }

        let known: HashSet<&str> = self
            .files_to_create
            .iter()
            .chain(self.files_to_modify.iter())
            .map(|f| f.path.as_str())
            .collect();
        for step in &self.steps {
            if !known.contains(step.file.as_str()) {
                violations.push(format!(
                    "step {} references '{}' which is in neither the creation nor the modification list",
                    step.sequence, step.file
                ));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed_plan() -> Plan {
        Plan::new("Create a greeting script", "Empty project")
            .with_creation(FileIntent::new("hello.py", "Prints a greeting"))
            .with_step(PlanStep::new(
                1,
                StepAction::Create,
                "hello.py",
                "Write a main that prints Hello World",
            ))
    }

    #[test]
    fn test_well_formed_plan_has_no_violations() {
        assert!(well_formed_plan().check_invariants().is_empty());
    }

    #[test]
    fn test_duplicate_sequence_detected() {
        let plan = well_formed_plan().with_step(PlanStep::new(
            1,
            StepAction::Modify,
            "hello.py",
            "Tweak the greeting",
        ));
        let violations = plan.check_invariants();
        assert!(violations.iter().any(|v| v.contains("duplicate")));
    }

    #[test]
    fn test_non_increasing_sequence_detected() {
        let mut plan = well_formed_plan();
        plan.steps.insert(
            0,
            PlanStep::new(5, StepAction::Create, "hello.py", "Out of order"),
        );
        let violations = plan.check_invariants();
        assert!(violations.iter().any(|v| v.contains("not increasing")));
    }

    #[test]
    fn test_unlisted_step_file_detected() {
        let plan = well_formed_plan().with_step(PlanStep::new(
            2,
            StepAction::Modify,
            "unknown.py",
            "Edit a file the plan never mentions",
        ));
        let violations = plan.check_invariants();
        assert!(violations.iter().any(|v| v.contains("unknown.py")));
    }

    #[test]
    fn test_step_action_parse() {
        assert_eq!(StepAction::parse("create"), Some(StepAction::Create));
        assert_eq!(StepAction::parse(" Modify "), Some(StepAction::Modify));
        assert_eq!(StepAction::parse("delete"), None);
    }

    #[test]
    fn test_empty_plan() {
        assert!(Plan::new("a", "b").is_empty());
        assert!(!well_formed_plan().is_empty());
    }
}
