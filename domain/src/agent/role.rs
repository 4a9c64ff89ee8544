//! Stage roles.

use super::capability::Capability;
use serde::{Deserialize, Serialize};

/// One agent role inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    /// Analyzes the request and produces the execution plan.
    Planner,
    /// Executes the plan, creating and modifying files.
    Implementer,
    /// Reviews the implementation and approves or requests fixes.
    Validator,
}

impl StageRole {
    pub fn as_str(&self) -> &str {
        match self {
            StageRole::Planner => "planner",
            StageRole::Implementer => "implementer",
            StageRole::Validator => "validator",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            StageRole::Planner => "Planning",
            StageRole::Implementer => "Implementation",
            StageRole::Validator => "Validation",
        }
    }

    /// The capability set this role is allowed to use.
    pub fn capability(&self) -> Capability {
        match self {
            StageRole::Planner => Capability::ReadOnly,
            StageRole::Implementer => Capability::ReadWrite,
            StageRole::Validator => Capability::Validation,
        }
    }

    /// Default conversation thread name for this role when session memory
    /// is scoped per stage.
    pub fn default_thread(&self) -> &'static str {
        match self {
            StageRole::Planner => "planning",
            StageRole::Implementer => "implementation",
            StageRole::Validator => "validation",
        }
    }
}

impl std::fmt::Display for StageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_capabilities() {
        assert_eq!(StageRole::Planner.capability(), Capability::ReadOnly);
        assert_eq!(StageRole::Implementer.capability(), Capability::ReadWrite);
        assert_eq!(StageRole::Validator.capability(), Capability::Validation);
    }

    #[test]
    fn test_default_threads_are_distinct() {
        let threads = [
            StageRole::Planner.default_thread(),
            StageRole::Implementer.default_thread(),
            StageRole::Validator.default_thread(),
        ];
        assert_eq!(
            threads.len(),
            threads.iter().collect::<std::collections::HashSet<_>>().len()
        );
    }
}
