//! Command execution tool: run_command
//!
//! Exploration commands only: a blocklist rejects anything that mutates
//! state or escalates privileges before the process is spawned. The command
//! runs inside the sandbox root.

use super::sandbox::SandboxRoot;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use triad_domain::{
    ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResult, ToolResultMetadata,
};

/// Tool name constant
pub const RUN_COMMAND: &str = "run_command";

/// Timeout for command execution
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum output size (characters)
const MAX_OUTPUT_SIZE: usize = 5000;

/// Patterns that disqualify a command outright.
const BLOCKED_PATTERNS: &[&str] = &[
    "rm ", "rm\t", "sudo", "su ", "> ", ">>", "mkfs", "dd ", "chmod", "chown", "| rm", "&& rm",
];

/// Get the tool definition for run_command
pub fn run_command_definition() -> ToolDefinition {
    ToolDefinition::new(
        RUN_COMMAND,
        "Run a read-only shell command (ls, find, wc, git log, ...) inside the working directory",
    )
    .with_parameter(ToolParameter::new("command", "The command to execute", true).with_type("string"))
}

/// Execute the run_command tool
pub fn execute_run_command(sandbox: &SandboxRoot, call: &ToolCall) -> ToolResult {
    let start = Instant::now();

    let command_str = match call.require_string("command") {
        Ok(c) => c,
        Err(e) => return ToolResult::failure(RUN_COMMAND, ToolError::invalid_argument(e)),
    };

    let lowered = command_str.to_lowercase();
    for pattern in BLOCKED_PATTERNS {
        if lowered.contains(pattern) {
            return ToolResult::failure(
                RUN_COMMAND,
                ToolError::permission_denied(format!(
                    "command blocked for safety: contains '{}'",
                    pattern.trim()
                )),
            );
        }
    }

    let mut cmd = Command::new("sh");
    cmd.args(["-c", command_str])
        .current_dir(sandbox.root())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            return ToolResult::failure(
                RUN_COMMAND,
                ToolError::execution_failed(format!("Failed to spawn command: {}", e)),
            );
        }
    };

    let output = match wait_with_timeout(child, COMMAND_TIMEOUT) {
        Ok(o) => o,
        Err(e) => return ToolResult::failure(RUN_COMMAND, ToolError::timeout(e)),
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    let exit_code = output.status.code().unwrap_or(-1);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut combined = String::new();
    combined.push_str(&stdout);
    if !stderr.is_empty() {
        if !combined.is_empty() {
            combined.push_str("\n--- stderr ---\n");
        }
        combined.push_str(&stderr);
    }
    if combined.len() > MAX_OUTPUT_SIZE {
        combined.truncate(MAX_OUTPUT_SIZE);
        combined.push_str("\n... (output truncated)");
    }
    if exit_code != 0 {
        combined.push_str(&format!("\n[exit code: {}]", exit_code));
    }
    if combined.trim().is_empty() {
        combined = "[no output]".to_string();
    }

    let bytes = combined.len();
    ToolResult::success(RUN_COMMAND, combined).with_metadata(ToolResultMetadata {
        duration_ms: Some(duration_ms),
        bytes: Some(bytes),
        exit_code: Some(exit_code),
        ..Default::default()
    })
}

/// Wait for a child process, killing it when the timeout expires.
pub(crate) fn wait_with_timeout(
    mut child: std::process::Child,
    timeout: Duration,
) -> Result<std::process::Output, String> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = child
                    .stdout
                    .take()
                    .map(|mut s| {
                        let mut buf = Vec::new();
                        std::io::Read::read_to_end(&mut s, &mut buf).ok();
                        buf
                    })
                    .unwrap_or_default();
                let stderr = child
                    .stderr
                    .take()
                    .map(|mut s| {
                        let mut buf = Vec::new();
                        std::io::Read::read_to_end(&mut s, &mut buf).ok();
                        buf
                    })
                    .unwrap_or_default();
                return Ok(std::process::Output {
                    status,
                    stdout,
                    stderr,
                });
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(format!("command timed out after {:?}", timeout));
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(format!("failed to wait for process: {}", e)),
        }
    }
}
