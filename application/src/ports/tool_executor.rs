//! Tool Executor port

use async_trait::async_trait;
use triad_domain::{ToolCall, ToolDefinition, ToolResult, ToolSpec};

/// Port for tool execution.
///
/// Implementations (adapters) live in the infrastructure layer. Stages never
/// hold an executor directly: they go through a
/// [`CapabilityGate`](crate::gate::CapabilityGate).
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get(name).is_some()
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Execute a tool call
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}
