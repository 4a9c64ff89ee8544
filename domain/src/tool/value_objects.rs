//! Tool value objects: immutable result and error types.
//!
//! Error codes drive how the reasoning loop reacts: most tool failures are
//! fed back into the loop as observations, while `CAPABILITY_VIOLATION`
//! aborts the stage invocation entirely.

use serde::{Deserialize, Serialize};

/// Well-known tool error codes.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const INVALID_RANGE: &str = "INVALID_RANGE";
    pub const EXECUTION_FAILED: &str = "EXECUTION_FAILED";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const OUT_OF_SANDBOX: &str = "OUT_OF_SANDBOX";
    pub const CAPABILITY_VIOLATION: &str = "CAPABILITY_VIOLATION";
    pub const NOT_PYTHON: &str = "NOT_PYTHON";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const NOT_A_REPO: &str = "NOT_A_REPO";
}

/// Error that occurred during tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "OUT_OF_SANDBOX")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            codes::NOT_FOUND,
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(
            codes::PERMISSION_DENIED,
            format!("Permission denied: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_ARGUMENT, message)
    }

    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_RANGE, message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(codes::EXECUTION_FAILED, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            codes::TIMEOUT,
            format!("Operation timed out: {}", operation.into()),
        )
    }

    pub fn out_of_sandbox(path: impl Into<String>) -> Self {
        Self::new(
            codes::OUT_OF_SANDBOX,
            format!(
                "Path resolves outside the sandbox root: {}",
                path.into()
            ),
        )
    }

    pub fn capability_violation(capability: impl Into<String>, tool: impl Into<String>) -> Self {
        Self::new(
            codes::CAPABILITY_VIOLATION,
            format!(
                "Tool '{}' is outside the {} capability set",
                tool.into(),
                capability.into()
            ),
        )
    }

    pub fn not_python(path: impl Into<String>) -> Self {
        Self::new(
            codes::NOT_PYTHON,
            format!("Not a Python file: {}", path.into()),
        )
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, message)
    }

    pub fn not_a_repo(path: impl Into<String>) -> Self {
        Self::new(
            codes::NOT_A_REPO,
            format!("Not a git repository: {}", path.into()),
        )
    }

    pub fn is_capability_violation(&self) -> bool {
        self.code == codes::CAPABILITY_VIOLATION
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output content (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    /// Metadata about the execution
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about tool execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Number of bytes processed/returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// For file operations: the affected path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// For subprocess tools: exit code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// For search operations: number of matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.metadata.path = Some(path.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }
}
