//! Git inspection tools: git_diff, git_status
//!
//! Both shell out to the `git` binary inside the sandbox root and fail with
//! `NOT_A_REPO` when the root is not under version control.

use super::command::wait_with_timeout;
use super::sandbox::SandboxRoot;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use triad_domain::{
    ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResult, ToolResultMetadata,
};

/// Tool name constants
pub const GIT_DIFF: &str = "git_diff";
pub const GIT_STATUS: &str = "git_status";

/// Timeout for git subprocesses
const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum diff output (characters)
const MAX_DIFF_SIZE: usize = 10_000;

/// Get the tool definition for git_diff
pub fn git_diff_definition() -> ToolDefinition {
    ToolDefinition::new(
        GIT_DIFF,
        "Show the unified diff of uncommitted changes in the working directory",
    )
    .with_parameter(
        ToolParameter::new("path", "Limit the diff to one file", false).with_type("path"),
    )
}

/// Get the tool definition for git_status
pub fn git_status_definition() -> ToolDefinition {
    ToolDefinition::new(
        GIT_STATUS,
        "List created, modified, deleted, and untracked files in the working directory",
    )
}

fn run_git(sandbox: &SandboxRoot, args: &[&str]) -> Result<std::process::Output, ToolError> {
    let mut cmd = Command::new("git");
    cmd.args(args)
        .current_dir(sandbox.root())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = cmd
        .spawn()
        .map_err(|e| ToolError::execution_failed(format!("Failed to run git: {}", e)))?;

    wait_with_timeout(child, GIT_TIMEOUT).map_err(ToolError::timeout)
}

fn check_repo_error(sandbox: &SandboxRoot, output: &std::process::Output) -> Option<ToolError> {
    if output.status.success() {
        return None;
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.to_lowercase().contains("not a git repository") {
        Some(ToolError::not_a_repo(sandbox.root().display().to_string()))
    } else {
        Some(ToolError::execution_failed(format!(
            "git failed: {}",
            stderr.trim()
        )))
    }
}

/// Execute the git_diff tool
pub fn execute_git_diff(sandbox: &SandboxRoot, call: &ToolCall) -> ToolResult {
    let start = Instant::now();

    let mut args = vec!["diff"];
    if let Some(path) = call.get_string("path") {
        // Keep the target inside the sandbox before handing it to git
        if let Err(e) = sandbox.resolve(path) {
            return ToolResult::failure(GIT_DIFF, e);
        }
        args.push(path);
    }

    let output = match run_git(sandbox, &args) {
        Ok(o) => o,
        Err(e) => return ToolResult::failure(GIT_DIFF, e),
    };
    if let Some(e) = check_repo_error(sandbox, &output) {
        return ToolResult::failure(GIT_DIFF, e);
    }

    let mut diff = String::from_utf8_lossy(&output.stdout).to_string();
    if diff.trim().is_empty() {
        diff = "No changes detected (working tree is clean)".to_string();
    } else if diff.len() > MAX_DIFF_SIZE {
        diff.truncate(MAX_DIFF_SIZE);
        diff.push_str("\n... (diff truncated)");
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    ToolResult::success(GIT_DIFF, diff).with_metadata(ToolResultMetadata {
        duration_ms: Some(duration_ms),
        ..Default::default()
    })
}

/// Execute the git_status tool
pub fn execute_git_status(sandbox: &SandboxRoot, call: &ToolCall) -> ToolResult {
    let _ = call;
    let start = Instant::now();

    let output = match run_git(sandbox, &["status", "--porcelain"]) {
        Ok(o) => o,
        Err(e) => return ToolResult::failure(GIT_STATUS, e),
    };
    if let Some(e) = check_repo_error(sandbox, &output) {
        return ToolResult::failure(GIT_STATUS, e);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rendered = render_status(&stdout);

    let duration_ms = start.elapsed().as_millis() as u64;
    ToolResult::success(GIT_STATUS, rendered).with_metadata(ToolResultMetadata {
        duration_ms: Some(duration_ms),
        ..Default::default()
    })
}

/// Parse `git status --porcelain` output into change-kind groups.
pub(crate) fn render_status(porcelain: &str) -> String {
    let mut modified = Vec::new();
    let mut added = Vec::new();
    let mut deleted = Vec::new();
    let mut untracked = Vec::new();

    for line in porcelain.lines() {
        if line.len() < 4 {
            continue;
        }
        let status = &line[..2];
        let path = line[3..].trim();
        if status == "??" {
            untracked.push(path);
        } else if status.contains('M') {
            modified.push(path);
        } else if status.contains('A') {
            added.push(path);
        } else if status.contains('D') {
            deleted.push(path);
        }
    }

    if modified.is_empty() && added.is_empty() && deleted.is_empty() && untracked.is_empty() {
        return "Working tree is clean (no changes)".to_string();
    }

    let mut out = vec!["Git status:".to_string()];
    for (label, group) in [
        ("Modified", &modified),
        ("Added", &added),
        ("Deleted", &deleted),
        ("Untracked", &untracked),
    ] {
        if group.is_empty() {
            continue;
        }
        out.push(format!("{} ({}):", label, group.len()));
        for path in group {
            out.push(format!("  {}", path));
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use triad_domain::tool::value_objects::codes;

    fn sandbox() -> (tempfile::TempDir, SandboxRoot) {
        let dir = tempfile::tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_render_status_groups() {
        let porcelain = " M src/app.py\nA  src/new.py\n D old.py\n?? scratch.txt\n";
        let rendered = render_status(porcelain);
        assert!(rendered.contains("Modified (1):"));
        assert!(rendered.contains("src/app.py"));
        assert!(rendered.contains("Added (1):"));
        assert!(rendered.contains("Deleted (1):"));
        assert!(rendered.contains("Untracked (1):"));
        assert!(rendered.contains("scratch.txt"));
    }

    #[test]
    fn test_render_status_clean() {
        assert!(render_status("").contains("clean"));
    }

    #[test]
    fn test_diff_outside_repo_fails() {
        let (_dir, root) = sandbox();
        let result = execute_git_diff(&root, &ToolCall::new(GIT_DIFF));
        // Either git is missing (EXECUTION_FAILED) or this is not a repo
        assert!(!result.is_success());
    }

    #[test]
    fn test_status_outside_repo_fails() {
        let (_dir, root) = sandbox();
        let result = execute_git_status(&root, &ToolCall::new(GIT_STATUS));
        assert!(!result.is_success());
    }

    #[test]
    fn test_diff_path_stays_in_sandbox() {
        let (_dir, root) = sandbox();
        let call = ToolCall::new(GIT_DIFF).with_arg("path", "../outside.py");
        let result = execute_git_diff(&root, &call);
        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::OUT_OF_SANDBOX);
    }
}
