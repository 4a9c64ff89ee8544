//! Local tool executor: the concrete implementation of [`ToolExecutorPort`].
//!
//! Validates each call against its definition, then dispatches to the
//! matching tool, passing the sandbox root along so every filesystem
//! operation stays confined.

use super::{command, file, git, lint, search, sandbox::SandboxRoot};
use async_trait::async_trait;
use triad_application::ports::tool_executor::ToolExecutorPort;
use triad_domain::{
    DefaultToolValidator, ToolCall, ToolError, ToolResult, ToolSpec, ToolValidator,
};

/// Executor that runs tools on the local machine inside a sandbox root.
#[derive(Debug, Clone)]
pub struct LocalToolExecutor {
    tool_spec: ToolSpec,
    sandbox: SandboxRoot,
}

impl LocalToolExecutor {
    /// Create an executor with the full tool surface.
    pub fn new(sandbox: SandboxRoot) -> Self {
        Self {
            tool_spec: super::full_tool_spec(),
            sandbox,
        }
    }

    /// Create an executor with a custom tool spec (tests, specialized setups).
    pub fn with_tools(sandbox: SandboxRoot, tool_spec: ToolSpec) -> Self {
        Self { tool_spec, sandbox }
    }

    pub fn sandbox(&self) -> &SandboxRoot {
        &self.sandbox
    }

    fn execute_internal(&self, call: &ToolCall) -> ToolResult {
        let definition = match self.tool_spec.get(&call.tool_name) {
            Some(d) => d,
            None => {
                return ToolResult::failure(
                    &call.tool_name,
                    ToolError::not_found(format!("Unknown tool: {}", call.tool_name)),
                );
            }
        };

        let validator = DefaultToolValidator;
        if let Err(e) = validator.validate(call, definition) {
            return ToolResult::failure(&call.tool_name, ToolError::invalid_argument(e));
        }

        match call.tool_name.as_str() {
            file::READ_FILE => file::execute_read_file(&self.sandbox, call),
            file::WRITE_FILE => file::execute_write_file(&self.sandbox, call),
            lint::LINT_FILE => lint::execute_lint_file(&self.sandbox, call),
            search::GREP_SEARCH => search::execute_grep_search(&self.sandbox, call),
            command::RUN_COMMAND => command::execute_run_command(&self.sandbox, call),
            git::GIT_DIFF => git::execute_git_diff(&self.sandbox, call),
            git::GIT_STATUS => git::execute_git_status(&self.sandbox, call),
            _ => ToolResult::failure(
                &call.tool_name,
                ToolError::execution_failed(format!(
                    "Tool '{}' is not implemented",
                    call.tool_name
                )),
            ),
        }
    }
}

#[async_trait]
impl ToolExecutorPort for LocalToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        self.execute_internal(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use triad_application::gate::CapabilityGate;
    use triad_domain::Capability;
    use triad_domain::tool::value_objects::codes;

    fn executor() -> (tempfile::TempDir, LocalToolExecutor) {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = SandboxRoot::new(dir.path()).unwrap();
        (dir, LocalToolExecutor::new(sandbox))
    }

    #[test]
    fn test_has_all_tools() {
        let (_dir, executor) = executor();
        for tool in [
            "read_file",
            "write_file",
            "lint_file",
            "grep_search",
            "run_command",
            "git_diff",
            "git_status",
        ] {
            assert!(executor.has_tool(tool), "missing {}", tool);
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (_dir, executor) = executor();
        let result = executor.execute(&ToolCall::new("unknown_tool")).await;
        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validation_error() {
        let (_dir, executor) = executor();
        // read_file without its required 'path'
        let result = executor.execute(&ToolCall::new("read_file")).await;
        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::INVALID_ARGUMENT);
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let (dir, executor) = executor();
        let write = ToolCall::new("write_file")
            .with_arg("path", "notes.txt")
            .with_arg("content", "remember this");
        assert!(executor.execute(&write).await.is_success());
        assert!(dir.path().join("notes.txt").exists());

        let read = ToolCall::new("read_file").with_arg("path", "notes.txt");
        let result = executor.execute(&read).await;
        assert!(result.output().unwrap().contains("remember this"));
    }

    /// A read-only stage attempting write_file always fails with a
    /// capability violation and leaves the filesystem untouched.
    #[tokio::test]
    async fn test_read_only_gate_blocks_writes_with_no_side_effects() {
        let (dir, executor) = executor();
        let gate = CapabilityGate::new(Arc::new(executor), Capability::ReadOnly);

        let call = ToolCall::new("write_file")
            .with_arg("path", "forbidden.txt")
            .with_arg("content", "nope");
        let result = gate.execute(&call).await;

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::CAPABILITY_VIOLATION);
        assert!(!dir.path().join("forbidden.txt").exists());
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_validation_gate_spec_subset() {
        let (_dir, executor) = executor();
        let gate = CapabilityGate::new(Arc::new(executor), Capability::Validation);

        let names: Vec<&str> = gate.tool_spec().names().collect();
        assert!(names.contains(&"git_diff"));
        assert!(names.contains(&"lint_file"));
        assert!(!names.contains(&"write_file"));
        assert!(!names.contains(&"run_command"));
    }
}
