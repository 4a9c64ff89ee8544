//! File operation tools: read_file, write_file

use super::sandbox::SandboxRoot;
use std::fs;
use std::time::Instant;
use triad_domain::{
    ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResult, ToolResultMetadata,
};

/// Tool name constants
pub const READ_FILE: &str = "read_file";
pub const WRITE_FILE: &str = "write_file";

/// Maximum file size to read (10 MB)
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Get the tool definition for read_file
pub fn read_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        READ_FILE,
        "Read the contents of a file, returned with line numbers",
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to read", true).with_type("path"))
    .with_parameter(
        ToolParameter::new("offset", "Line number to start from (1-indexed)", false)
            .with_type("number"),
    )
    .with_parameter(
        ToolParameter::new("limit", "Maximum number of lines to return", false).with_type("number"),
    )
}

/// Get the tool definition for write_file
pub fn write_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        WRITE_FILE,
        "Write content to a file, optionally replacing a line range. Creates the file and parent directories if needed.",
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to write", true).with_type("path"))
    .with_parameter(
        ToolParameter::new("content", "Content to write", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new(
            "start_line",
            "First line to replace (1-indexed, default 1)",
            false,
        )
        .with_type("number"),
    )
    .with_parameter(
        ToolParameter::new(
            "end_line",
            "Last line to replace (1-indexed, -1 = end of file, default -1)",
            false,
        )
        .with_type("number"),
    )
}

/// Execute the read_file tool
pub fn execute_read_file(sandbox: &SandboxRoot, call: &ToolCall) -> ToolResult {
    let start = Instant::now();

    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(READ_FILE, ToolError::invalid_argument(e)),
    };

    let path = match sandbox.resolve(path_str) {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(READ_FILE, e),
    };

    if !path.exists() {
        return ToolResult::failure(READ_FILE, ToolError::not_found(path_str));
    }
    if !path.is_file() {
        return ToolResult::failure(
            READ_FILE,
            ToolError::invalid_argument(format!("'{}' is not a file", path_str)),
        );
    }

    match fs::metadata(&path) {
        Ok(metadata) if metadata.len() > MAX_READ_SIZE => {
            return ToolResult::failure(
                READ_FILE,
                ToolError::invalid_argument(format!(
                    "File too large ({} bytes). Maximum size is {} bytes",
                    metadata.len(),
                    MAX_READ_SIZE
                )),
            );
        }
        Ok(_) => {}
        Err(e) => {
            return ToolResult::failure(
                READ_FILE,
                ToolError::execution_failed(format!("Failed to stat file: {}", e)),
            );
        }
    }

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                return ToolResult::failure(READ_FILE, ToolError::permission_denied(path_str));
            }
            return ToolResult::failure(
                READ_FILE,
                ToolError::execution_failed(format!("Failed to read file: {}", e)),
            );
        }
    };

    // Line numbers are always from the original file, so an offset window
    // still shows real positions.
    let offset = call.get_i64("offset").unwrap_or(1).max(1) as usize;
    let limit = call.get_i64("limit").map(|l| l.max(0) as usize);

    let numbered: Vec<String> = content
        .lines()
        .enumerate()
        .skip(offset - 1)
        .take(limit.unwrap_or(usize::MAX))
        .map(|(index, line)| format!("{}: {}", index + 1, line))
        .collect();
    let output = numbered.join("\n");

    let duration_ms = start.elapsed().as_millis() as u64;
    let bytes = output.len();

    ToolResult::success(READ_FILE, output).with_metadata(ToolResultMetadata {
        duration_ms: Some(duration_ms),
        bytes: Some(bytes),
        path: Some(path_str.to_string()),
        ..Default::default()
    })
}

/// Execute the write_file tool
pub fn execute_write_file(sandbox: &SandboxRoot, call: &ToolCall) -> ToolResult {
    let start = Instant::now();

    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(WRITE_FILE, ToolError::invalid_argument(e)),
    };
    let content = match call.require_string("content") {
        Ok(c) => c,
        Err(e) => return ToolResult::failure(WRITE_FILE, ToolError::invalid_argument(e)),
    };

    let path = match sandbox.resolve(path_str) {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(WRITE_FILE, e),
    };

    let start_line = call.get_i64("start_line").unwrap_or(1);
    let end_line = call.get_i64("end_line").unwrap_or(-1);

    if start_line < 1 {
        return ToolResult::failure(
            WRITE_FILE,
            ToolError::invalid_range(format!("start_line must be >= 1, got {}", start_line)),
        );
    }
    if end_line != -1 && end_line < start_line - 1 {
        return ToolResult::failure(
            WRITE_FILE,
            ToolError::invalid_range(format!(
                "end_line {} is before start_line {}",
                end_line, start_line
            )),
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                return ToolResult::failure(
                    WRITE_FILE,
                    ToolError::execution_failed(format!(
                        "Failed to create parent directories: {}",
                        e
                    )),
                );
            }
        }
    }

    let mut lines: Vec<String> = if path.exists() {
        match fs::read_to_string(&path) {
            Ok(existing) => existing.lines().map(|l| l.to_string()).collect(),
            Err(e) => {
                return ToolResult::failure(
                    WRITE_FILE,
                    ToolError::execution_failed(format!("Failed to read existing file: {}", e)),
                );
            }
        }
    } else {
        Vec::new()
    };

    let start_idx = (start_line - 1) as usize;
    if start_idx > lines.len() {
        return ToolResult::failure(
            WRITE_FILE,
            ToolError::invalid_range(format!(
                "start_line {} is beyond the end of the file ({} lines)",
                start_line,
                lines.len()
            )),
        );
    }
    let end_idx = if end_line == -1 {
        lines.len()
    } else {
        (end_line as usize).min(lines.len())
    };

    let new_lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();
    lines.splice(start_idx..end_idx, new_lines);

    let mut rendered = lines.join("\n");
    rendered.push('\n');

    let bytes = rendered.len();
    if let Err(e) = fs::write(&path, rendered) {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            return ToolResult::failure(WRITE_FILE, ToolError::permission_denied(path_str));
        }
        return ToolResult::failure(
            WRITE_FILE,
            ToolError::execution_failed(format!("Failed to write file: {}", e)),
        );
    }

    let duration_ms = start.elapsed().as_millis() as u64;

    ToolResult::success(
        WRITE_FILE,
        format!(
            "Wrote {} bytes to '{}' (lines {}-{})",
            bytes, path_str, start_line, end_idx
        ),
    )
    .with_metadata(ToolResultMetadata {
        duration_ms: Some(duration_ms),
        bytes: Some(bytes),
        path: Some(path_str.to_string()),
        ..Default::default()
    })
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
    fn test_read_file_adds_line_numbers() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("f.txt"), "alpha\nbeta\n").unwrap();

        let call = ToolCall::new(READ_FILE).with_arg("path", "f.txt");
        let result = execute_read_file(&root, &call);

        assert!(result.is_success());
        assert_eq!(result.output().unwrap(), "1: alpha\n2: beta");
    }

    #[test]
    fn test_read_file_offset_keeps_real_numbers() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("f.txt"), "a\nb\nc\nd\n").unwrap();

        let call = ToolCall::new(READ_FILE)
            .with_arg("path", "f.txt")
            .with_arg("offset", 2i64)
            .with_arg("limit", 2i64);
        let result = execute_read_file(&root, &call);

        assert_eq!(result.output().unwrap(), "2: b\n3: c");
    }

    #[test]
    fn test_read_file_not_found() {
        let (_dir, root) = sandbox();
        let call = ToolCall::new(READ_FILE).with_arg("path", "missing.txt");
        let result = execute_read_file(&root, &call);

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::NOT_FOUND);
    }

    #[test]
    fn test_read_file_outside_sandbox() {
        let (_dir, root) = sandbox();
        let call = ToolCall::new(READ_FILE).with_arg("path", "../outside.txt");
        let result = execute_read_file(&root, &call);

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::OUT_OF_SANDBOX);
    }

    #[test]
    fn test_write_file_creates_with_parents() {
        let (dir, root) = sandbox();
        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "src/pkg/mod.py")
            .with_arg("content", "x = 1");
        let result = execute_write_file(&root, &call);

        assert!(result.is_success());
        let written = fs::read_to_string(dir.path().join("src/pkg/mod.py")).unwrap();
        assert_eq!(written, "x = 1\n");
    }

    #[test]
    fn test_write_file_replaces_line_range() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("f.py"), "one\ntwo\nthree\nfour\n").unwrap();

        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "f.py")
            .with_arg("content", "TWO\nTHREE")
            .with_arg("start_line", 2i64)
            .with_arg("end_line", 3i64);
        let result = execute_write_file(&root, &call);

        assert!(result.is_success());
        let written = fs::read_to_string(dir.path().join("f.py")).unwrap();
        assert_eq!(written, "one\nTWO\nTHREE\nfour\n");
    }

    #[test]
    fn test_write_file_append_via_start_beyond_content() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("f.py"), "one\n").unwrap();

        // start_line == len + 1 appends
        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "f.py")
            .with_arg("content", "two")
            .with_arg("start_line", 2i64)
            .with_arg("end_line", -1i64);
        let result = execute_write_file(&root, &call);

        assert!(result.is_success());
        assert_eq!(fs::read_to_string(dir.path().join("f.py")).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_write_file_invalid_range() {
        let (_dir, root) = sandbox();
        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "f.py")
            .with_arg("content", "x")
            .with_arg("start_line", 0i64);
        let result = execute_write_file(&root, &call);

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::INVALID_RANGE);
    }

    #[test]
    fn test_write_file_start_past_end_of_file() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("f.py"), "one\n").unwrap();

        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "f.py")
            .with_arg("content", "x")
            .with_arg("start_line", 10i64);
        let result = execute_write_file(&root, &call);

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::INVALID_RANGE);
    }

    #[test]
    fn test_write_file_outside_sandbox_has_no_effect() {
        let (_dir, root) = sandbox();
        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "/tmp/triad-escape-test.txt")
            .with_arg("content", "should not exist");
        let result = execute_write_file(&root, &call);

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, codes::OUT_OF_SANDBOX);
        assert!(!std::path::Path::new("/tmp/triad-escape-test.txt").exists());
    }
}
