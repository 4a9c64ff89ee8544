//! Lint tool: lint_file
//!
//! Runs pylint as a subprocess and condenses its output into a score plus
//! categorized issues. A syntax error (pylint code E0001) is reported as
//! `PARSE_ERROR` rather than a score, matching how the stages are told to
//! treat unparseable files as blocking.

use super::command::wait_with_timeout;
use super::sandbox::SandboxRoot;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use triad_domain::{
    LintIssue, ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResult, ToolResultMetadata,
};

/// Tool name constant
pub const LINT_FILE: &str = "lint_file";

/// Timeout for the linter subprocess
const LINT_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the tool definition for lint_file
pub fn lint_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        LINT_FILE,
        "Run pylint on a Python file and return the score and issues",
    )
    .with_parameter(
        ToolParameter::new("path", "Path to the Python file to lint", true).with_type("path"),
    )
}

/// Execute the lint_file tool
pub fn execute_lint_file(sandbox: &SandboxRoot, call: &ToolCall) -> ToolResult {
    let start = Instant::now();

    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(LINT_FILE, ToolError::invalid_argument(e)),
    };

    let path = match sandbox.resolve(path_str) {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(LINT_FILE, e),
    };

    if !path.exists() {
        return ToolResult::failure(LINT_FILE, ToolError::not_found(path_str));
    }
    if path.extension().and_then(|e| e.to_str()) != Some("py") {
        return ToolResult::failure(LINT_FILE, ToolError::not_python(path_str));
    }

    let pylint = match which::which("pylint") {
        Ok(p) => p,
        Err(_) => {
            return ToolResult::failure(
                LINT_FILE,
                ToolError::execution_failed("pylint is not installed or not in PATH"),
            );
        }
    };

    let mut cmd = Command::new(pylint);
    cmd.arg("--output-format=text")
        .arg(&path)
        .current_dir(sandbox.root())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            return ToolResult::failure(
                LINT_FILE,
                ToolError::execution_failed(format!("Failed to run pylint: {}", e)),
            );
        }
    };

    let output = match wait_with_timeout(child, LINT_TIMEOUT) {
        Ok(o) => o,
        Err(e) => return ToolResult::failure(LINT_FILE, ToolError::timeout(e)),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report = parse_pylint_output(&stdout);

    // E0001 means pylint could not parse the file at all
    if let Some(syntax) = report
        .issues
        .iter()
        .find(|i| i.message.contains("E0001") || i.severity == "error" && i.message.contains("syntax"))
    {
        return ToolResult::failure(
            LINT_FILE,
            ToolError::parse_error(format!(
                "Syntax error in '{}' at line {}: {}",
                path_str, syntax.line, syntax.message
            )),
        );
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    let rendered = render_report(path_str, &report);

    ToolResult::success(LINT_FILE, rendered).with_metadata(ToolResultMetadata {
        duration_ms: Some(duration_ms),
        path: Some(path_str.to_string()),
        match_count: Some(report.issues.len()),
        ..Default::default()
    })
}

/// Parsed pylint output.
#[derive(Debug, Default)]
pub(crate) struct PylintReport {
    pub score: Option<f64>,
    pub issues: Vec<LintIssue>,
}

/// Parse pylint text output into a score and issue list.
///
/// Message lines look like `path:line:col: C0114: missing-module-docstring`,
/// and the score line like `Your code has been rated at 8.50/10`.
pub(crate) fn parse_pylint_output(output: &str) -> PylintReport {
    let mut report = PylintReport::default();

    for line in output.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("Your code has been rated at ") {
            if let Some(score_str) = rest.split('/').next() {
                report.score = score_str.trim().parse().ok();
            }
            continue;
        }

        // path:line:col: CODE: message
        let mut parts = line.splitn(4, ':');
        let (Some(_path), Some(line_no), Some(_col), Some(rest)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let Ok(line_no) = line_no.trim().parse::<u32>() else {
            continue;
        };
        let message = rest.trim();
        let severity = match message.chars().next() {
            Some('E') | Some('F') => "error",
            Some('W') => "warning",
            Some('C') => "convention",
            Some('R') => "refactor",
            _ => continue,
        };
        report
            .issues
            .push(LintIssue::new(line_no, severity, message));
    }

    report
}

fn render_report(path: &str, report: &PylintReport) -> String {
    let mut out = Vec::new();
    match report.score {
        Some(score) => out.push(format!("Lint results for '{}': {:.2}/10", path, score)),
        None => out.push(format!("Lint results for '{}': no score reported", path)),
    }

    if report.issues.is_empty() {
        out.push("No issues found".to_string());
    } else {
        for severity in ["error", "warning", "convention", "refactor"] {
            let group: Vec<&LintIssue> = report
                .issues
                .iter()
                .filter(|i| i.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }
            out.push(format!("{}s ({}):", severity, group.len()));
            for issue in group.iter().take(10) {
                out.push(format!("  Line {}: {}", issue.line, issue.message));
            }
            if group.len() > 10 {
                out.push(format!("  ... and {} more", group.len() - 10));
            }
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use triad_domain::tool::value_objects::codes;

    fn sandbox() -> (tempfile::TempDir, SandboxRoot) {
        let dir = tempfile::tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_not_python_rejected() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let call = ToolCall::new(LINT_FILE).with_arg("path", "notes.txt");
        let result = execute_lint_file(&root, &call);

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::NOT_PYTHON);
    }

    #[test]
    fn test_missing_file_rejected() {
        let (_dir, root) = sandbox();
        let call = ToolCall::new(LINT_FILE).with_arg("path", "missing.py");
        let result = execute_lint_file(&root, &call);

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::NOT_FOUND);
    }

    #[test]
    fn test_parse_score_line() {
        let output = "\n------------------------------------\nYour code has been rated at 8.50/10\n";
        let report = parse_pylint_output(output);
        assert_eq!(report.score, Some(8.5));
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_parse_message_lines() {
        let output = "\
src/app.py:3:0: C0114: Missing module docstring (missing-module-docstring)
src/app.py:10:4: W0612: Unused variable 'x' (unused-variable)
src/app.py:12:0: E0602: Undefined variable 'y' (undefined-variable)

Your code has been rated at 6.00/10";
        let report = parse_pylint_output(output);
        assert_eq!(report.score, Some(6.0));
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.issues[0].severity, "convention");
        assert_eq!(report.issues[0].line, 3);
        assert_eq!(report.issues[1].severity, "warning");
        assert_eq!(report.issues[2].severity, "error");
    }

    #[test]
    fn test_parse_ignores_noise_lines() {
        let output = "************* Module app\nsome unrelated line\n";
        let report = parse_pylint_output(output);
        assert!(report.issues.is_empty());
        assert!(report.score.is_none());
    }

    #[test]
    fn test_render_groups_by_severity() {
        let report = PylintReport {
            score: Some(7.0),
            issues: vec![
                LintIssue::new(1, "error", "E0602: undefined variable"),
                LintIssue::new(2, "warning", "W0612: unused variable"),
            ],
        };
        let rendered = render_report("app.py", &report);
        assert!(rendered.contains("7.00/10"));
        assert!(rendered.contains("errors (1):"));
        assert!(rendered.contains("warnings (1):"));
    }
}
