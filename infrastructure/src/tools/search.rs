//! Search tool: grep_search

use super::sandbox::SandboxRoot;
use glob::glob;
use regex::RegexBuilder;
use std::fs;
use std::time::Instant;
use triad_domain::{
    ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResult, ToolResultMetadata,
};

/// Tool name constant
pub const GREP_SEARCH: &str = "grep_search";

/// Maximum matches shown per file
const MAX_MATCHES_PER_FILE: usize = 10;

/// Maximum total output (characters)
const MAX_OUTPUT_SIZE: usize = 8000;

/// Maximum file size to search (5 MB)
const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Get the tool definition for grep_search
pub fn grep_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        GREP_SEARCH,
        "Search for a text or regex pattern across files in the working directory",
    )
    .with_parameter(
        ToolParameter::new("pattern", "Regex pattern to search for", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new(
            "file_glob",
            "Glob filter for files to search (default '**/*.py')",
            false,
        )
        .with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("case_sensitive", "Match case exactly (default false)", false)
            .with_type("boolean"),
    )
}

/// Execute the grep_search tool
pub fn execute_grep_search(sandbox: &SandboxRoot, call: &ToolCall) -> ToolResult {
    let start = Instant::now();

    let pattern = match call.require_string("pattern") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(GREP_SEARCH, ToolError::invalid_argument(e)),
    };
    let file_glob = call.get_string("file_glob").unwrap_or("**/*.py");
    let case_sensitive = call.get_bool("case_sensitive").unwrap_or(false);

    // Invalid regex degrades to a literal search instead of failing
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(!case_sensitive)
                .build()
        });
    let regex = match regex {
        Ok(r) => r,
        Err(e) => {
            return ToolResult::failure(
                GREP_SEARCH,
                ToolError::invalid_argument(format!("Unusable pattern: {}", e)),
            );
        }
    };

    let full_pattern = format!("{}/{}", sandbox.root().display(), file_glob);
    let entries = match glob(&full_pattern) {
        Ok(paths) => paths,
        Err(e) => {
            return ToolResult::failure(
                GREP_SEARCH,
                ToolError::invalid_argument(format!("Invalid glob pattern: {}", e)),
            );
        }
    };

    // (relative path, line number, matched line)
    let mut matches: Vec<(String, usize, String)> = Vec::new();
    for entry in entries.flatten() {
        if !entry.is_file() {
            continue;
        }
        if fs::metadata(&entry)
            .map(|m| m.len() > MAX_FILE_SIZE)
            .unwrap_or(true)
        {
            continue;
        }
        let Ok(content) = fs::read_to_string(&entry) else {
            continue; // binary or unreadable, skip
        };
        let rel = entry
            .strip_prefix(sandbox.root())
            .unwrap_or(&entry)
            .display()
            .to_string();
        for (index, line) in content.lines().enumerate() {
            if regex.is_match(line) {
                matches.push((rel.clone(), index + 1, line.trim().to_string()));
            }
        }
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    let total = matches.len();

    if matches.is_empty() {
        return ToolResult::success(
            GREP_SEARCH,
            format!(
                "No matches for '{}' in files matching '{}'",
                pattern, file_glob
            ),
        )
        .with_metadata(ToolResultMetadata {
            duration_ms: Some(duration_ms),
            match_count: Some(0),
            ..Default::default()
        });
    }

    let mut out = vec![format!(
        "Matches for '{}' in '{}':",
        pattern, file_glob
    )];
    let mut current_file = String::new();
    let mut shown_in_file = 0usize;
    for (path, line_no, text) in &matches {
        if *path != current_file {
            current_file = path.clone();
            shown_in_file = 0;
            out.push(format!("{}:", path));
        }
        shown_in_file += 1;
        if shown_in_file == MAX_MATCHES_PER_FILE + 1 {
            out.push("  ...".to_string());
        }
        if shown_in_file > MAX_MATCHES_PER_FILE {
            continue;
        }
        out.push(format!("  Line {}: {}", line_no, text));
    }
    out.push(format!("Total: {} matches", total));

    let mut rendered = out.join("\n");
    if rendered.len() > MAX_OUTPUT_SIZE {
        rendered.truncate(MAX_OUTPUT_SIZE);
        rendered.push_str("\n... (results truncated)");
    }

    ToolResult::success(GREP_SEARCH, rendered).with_metadata(ToolResultMetadata {
        duration_ms: Some(duration_ms),
        match_count: Some(total),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> (tempfile::TempDir, SandboxRoot) {
        let dir = tempfile::tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_finds_matches_with_line_numbers() {
        let (dir, root) = sandbox();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src/app.py"),
            "import os\n\ndef main():\n    print('hi')\n",
        )
        .unwrap();

        let call = ToolCall::new(GREP_SEARCH).with_arg("pattern", "def main");
        let result = execute_grep_search(&root, &call);

        assert!(result.is_success());
        let output = result.output().unwrap();
        assert!(output.contains("src/app.py"));
        assert!(output.contains("Line 3"));
        assert_eq!(result.metadata.match_count, Some(1));
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("a.py"), "TODO: fix this\n").unwrap();

        let call = ToolCall::new(GREP_SEARCH).with_arg("pattern", "todo");
        let result = execute_grep_search(&root, &call);
        assert_eq!(result.metadata.match_count, Some(1));

        let call = ToolCall::new(GREP_SEARCH)
            .with_arg("pattern", "todo")
            .with_arg("case_sensitive", true);
        let result = execute_grep_search(&root, &call);
        assert_eq!(result.metadata.match_count, Some(0));
    }

    #[test]
    fn test_glob_filter() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("a.py"), "needle\n").unwrap();
        fs::write(dir.path().join("b.txt"), "needle\n").unwrap();

        let call = ToolCall::new(GREP_SEARCH)
            .with_arg("pattern", "needle")
            .with_arg("file_glob", "**/*.txt");
        let result = execute_grep_search(&root, &call);

        let output = result.output().unwrap();
        assert!(output.contains("b.txt"));
        assert!(!output.contains("a.py"));
    }

    #[test]
    fn test_no_matches_is_success() {
        let (_dir, root) = sandbox();
        let call = ToolCall::new(GREP_SEARCH).with_arg("pattern", "nothing_here");
        let result = execute_grep_search(&root, &call);

        assert!(result.is_success());
        assert!(result.output().unwrap().contains("No matches"));
    }

    #[test]
    fn test_invalid_regex_degrades_to_literal() {
        let (dir, root) = sandbox();
        fs::write(dir.path().join("a.py"), "weird [pattern here\n").unwrap();

        let call = ToolCall::new(GREP_SEARCH).with_arg("pattern", "[pattern");
        let result = execute_grep_search(&root, &call);

        assert!(result.is_success());
        assert_eq!(result.metadata.match_count, Some(1));
    }
}
