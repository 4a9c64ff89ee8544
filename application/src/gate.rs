//! Capability gate: the enforced tool invocation boundary.
//!
//! Wraps a [`ToolExecutorPort`] and rejects any call outside the stage's
//! capability set *before* it reaches the executor, so a violating call has
//! zero side effects. Rejection is an explicit `CAPABILITY_VIOLATION`
//! failure, never a silent no-op.

use crate::ports::tool_executor::ToolExecutorPort;
use async_trait::async_trait;
use std::sync::Arc;
use triad_domain::{Capability, ToolCall, ToolError, ToolResult, ToolSpec};

/// A capability-restricted view of a tool executor.
pub struct CapabilityGate<T: ToolExecutorPort> {
    inner: Arc<T>,
    capability: Capability,
    /// The permitted subset of the inner executor's spec: this is what the
    /// stage advertises to the model.
    spec: ToolSpec,
}

impl<T: ToolExecutorPort> CapabilityGate<T> {
    pub fn new(inner: Arc<T>, capability: Capability) -> Self {
        let spec = inner.tool_spec().retained(|name| capability.permits(name));
        Self {
            inner,
            capability,
            spec,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }
}

#[async_trait]
impl<T: ToolExecutorPort> ToolExecutorPort for CapabilityGate<T> {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        if !self.capability.permits(&call.tool_name) {
            return ToolResult::failure(
                &call.tool_name,
                ToolError::capability_violation(self.capability.as_str(), &call.tool_name),
            );
        }
        self.inner.execute(call).await
    }
}
