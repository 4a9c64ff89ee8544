//! Tool capability sets: the boundary between a stage and its tools.
//!
//! Each stage declares exactly one [`Capability`]. The capability maps to an
//! enumerated subset of tool names; any call outside the subset is rejected
//! at the tool boundary with a `CAPABILITY_VIOLATION` error, never silently
//! dropped.

use serde::{Deserialize, Serialize};

/// Tool names known to the capability model.
pub mod tool_names {
    pub const READ_FILE: &str = "read_file";
    pub const WRITE_FILE: &str = "write_file";
    pub const LINT_FILE: &str = "lint_file";
    pub const GREP_SEARCH: &str = "grep_search";
    pub const RUN_COMMAND: &str = "run_command";
    pub const GIT_DIFF: &str = "git_diff";
    pub const GIT_STATUS: &str = "git_status";
}

/// The capability set of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Exploration only: read files, search, run read-only commands.
    ReadOnly,
    /// Exploration plus file mutation and linting.
    ReadWrite,
    /// Exploration plus linting and git inspection; no mutation.
    Validation,
}

impl Capability {
    pub fn as_str(&self) -> &str {
        match self {
            Capability::ReadOnly => "read-only",
            Capability::ReadWrite => "read-write",
            Capability::Validation => "validation",
        }
    }

    /// The enumerated tool subset this capability can reach.
    pub fn permitted_tools(&self) -> &'static [&'static str] {
        use tool_names::*;
        match self {
            Capability::ReadOnly => &[READ_FILE, GREP_SEARCH, RUN_COMMAND],
            Capability::ReadWrite => &[READ_FILE, WRITE_FILE, LINT_FILE, RUN_COMMAND],
            Capability::Validation => &[READ_FILE, LINT_FILE, GIT_DIFF, GIT_STATUS],
        }
    }

    /// Check whether a tool name is inside this capability set.
    pub fn permits(&self, tool_name: &str) -> bool {
        self.permitted_tools().contains(&tool_name)
    }

    /// Whether this capability may mutate the filesystem.
    pub fn allows_writes(&self) -> bool {
        matches!(self, Capability::ReadWrite)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_permits_exploration_only() {
        let cap = Capability::ReadOnly;
        assert!(cap.permits("read_file"));
        assert!(cap.permits("grep_search"));
        assert!(cap.permits("run_command"));
        assert!(!cap.permits("write_file"));
        assert!(!cap.permits("git_diff"));
        assert!(!cap.allows_writes());
    }

    #[test]
    fn test_read_write_permits_mutation() {
        let cap = Capability::ReadWrite;
        assert!(cap.permits("write_file"));
        assert!(cap.permits("lint_file"));
        assert!(!cap.permits("git_status"));
        assert!(cap.allows_writes());
    }

    #[test]
    fn test_validation_permits_git_but_not_writes() {
        let cap = Capability::Validation;
        assert!(cap.permits("git_diff"));
        assert!(cap.permits("git_status"));
        assert!(cap.permits("lint_file"));
        assert!(!cap.permits("write_file"));
        assert!(!cap.permits("run_command"));
        assert!(!cap.allows_writes());
    }

    #[test]
    fn test_unknown_tool_never_permitted() {
        for cap in [
            Capability::ReadOnly,
            Capability::ReadWrite,
            Capability::Validation,
        ] {
            assert!(!cap.permits("launch_missiles"));
        }
    }
}
