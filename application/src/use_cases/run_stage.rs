//! Single agent stage execution.
//!
//! A [`StageRunner`] drives one bounded reasoning loop: it sends the
//! conversation to the gateway, executes the tool calls the model requests
//! (through the stage's capability gate), feeds the results back as
//! observations, and repeats until the model answers without tool calls or
//! the turn budget runs out.
//!
//! Tool failures are recoverable *within* the loop: they go back to the
//! model as observations so it can adapt. Two exceptions abort the stage:
//! a capability violation (the stage tried to leave its sandbox of tools)
//! and gateway-level failures (timeout, model error, rate limit). Those
//! surface as [`StageError`] and are consumed by the orchestrator.

use crate::config::PipelineParams;
use crate::gate::CapabilityGate;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::PipelineProgress;
use crate::ports::tool_executor::ToolExecutorPort;
use std::sync::Arc;
use tracing::{debug, warn};
use triad_domain::{
    Capability, LlmResponse, Message, StagePromptTemplate, StageReport, StageRole, ThreadId,
    ThreadStore, ToolCall, ToolDefinition, coerce,
};

/// Errors that abort a stage invocation.
///
/// All of these are recoverable by the orchestrator: they are consumed as a
/// non-approved validation outcome and count against the fix-loop budget.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Stage attempted tool '{tool}' outside its {capability} capability")]
    CapabilityViolation { tool: String, capability: Capability },

    #[error("Stage timed out waiting for the model")]
    StageTimeout,

    #[error("Gateway failure: {0}")]
    Gateway(GatewayError),
}

impl From<GatewayError> for StageError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout => StageError::StageTimeout,
            other => StageError::Gateway(other),
        }
    }
}

/// Executes one agent stage against its capability-gated tools.
pub struct StageRunner<G: LlmGateway, T: ToolExecutorPort> {
    role: StageRole,
    gateway: Arc<G>,
    tools: Arc<CapabilityGate<T>>,
    system_override: Option<String>,
}

impl<G: LlmGateway, T: ToolExecutorPort> StageRunner<G, T> {
    pub fn new(role: StageRole, gateway: Arc<G>, tools: Arc<CapabilityGate<T>>) -> Self {
        Self {
            role,
            gateway,
            tools,
            system_override: None,
        }
    }

    /// Replace the role-derived system prompt (used by the single-request
    /// mode, which is not one of the pipeline roles).
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_override = Some(prompt.into());
        self
    }

    pub fn role(&self) -> StageRole {
        self.role
    }

    fn system_prompt(&self) -> String {
        match &self.system_override {
            Some(prompt) => prompt.clone(),
            None => StagePromptTemplate::system_for(&self.role, self.tools.tool_spec()),
        }
    }

    async fn generate(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolDefinition],
        params: &PipelineParams,
    ) -> Result<LlmResponse, StageError> {
        match tokio::time::timeout(
            params.stage_timeout,
            self.gateway.generate(system_prompt, history, tools),
        )
        .await
        {
            Ok(result) => result.map_err(StageError::from),
            Err(_) => Err(StageError::StageTimeout),
        }
    }

    /// Drive the reasoning loop until the model produces a final text
    /// answer, appending every exchange to the stage's thread.
    pub async fn run_to_text(
        &self,
        store: &mut ThreadStore,
        thread: &ThreadId,
        input: &str,
        params: &PipelineParams,
        progress: &dyn PipelineProgress,
    ) -> Result<String, StageError> {
        progress.on_stage_start(&self.role);

        let system_prompt = self.system_prompt();
        let tool_defs: Vec<ToolDefinition> = self.tools.tool_spec().all().cloned().collect();

        store.append(thread, Message::user(input));

        let mut last_text = String::new();
        let mut turn = 0usize;

        loop {
            turn += 1;
            progress.on_llm_turn(&self.role, turn);

            let response = self
                .generate(&system_prompt, store.history(thread), &tool_defs, params)
                .await?;

            let text = response.text_content();
            if !text.is_empty() {
                last_text = text.clone();
            }

            let calls = response.tool_calls();
            if calls.is_empty() {
                store.append(thread, Message::assistant(&text));
                progress.on_stage_complete(&self.role, true);
                return Ok(if text.is_empty() { last_text } else { text });
            }

            store.append(
                thread,
                Message::assistant(render_assistant_turn(&text, &calls)),
            );

            if turn >= params.max_reasoning_turns {
                warn!(
                    role = self.role.as_str(),
                    turns = turn,
                    "reasoning loop hit its turn budget"
                );
                progress.on_stage_complete(&self.role, false);
                return Ok(last_text);
            }

            let mut observations = Vec::with_capacity(calls.len());
            for call in &calls {
                progress.on_tool_call(&call.tool_name, &summarize_args(call));
                let result = self.tools.execute(call).await;
                progress.on_tool_result(&call.tool_name, result.is_success());

                match result.error() {
                    Some(error) if error.is_capability_violation() => {
                        progress.on_stage_complete(&self.role, false);
                        return Err(StageError::CapabilityViolation {
                            tool: call.tool_name.clone(),
                            capability: self.tools.capability(),
                        });
                    }
                    Some(error) => {
                        observations.push(format!("[{} error] {}", call.tool_name, error));
                    }
                    None => {
                        observations.push(format!(
                            "[{}]\n{}",
                            call.tool_name,
                            result.output().unwrap_or("")
                        ));
                    }
                }
            }

            debug!(
                role = self.role.as_str(),
                turn,
                observations = observations.len(),
                "feeding tool observations back to the model"
            );
            store.append(
                thread,
                Message::user(format!("Observations:\n{}", observations.join("\n---\n"))),
            );
        }
    }

    /// Run the stage and coerce its final output into a report.
    ///
    /// On a schema violation the stage gets one corrective retry on the same
    /// thread; if that also fails the raw text is wrapped in the report's
    /// typed fallback so the pipeline never hard-fails on malformed output.
    pub async fn invoke<R: StageReport>(
        &self,
        store: &mut ThreadStore,
        thread: &ThreadId,
        input: &str,
        params: &PipelineParams,
        progress: &dyn PipelineProgress,
    ) -> Result<R, StageError> {
        let text = self
            .run_to_text(store, thread, input, params, progress)
            .await?;

        match coerce::<R>(&text) {
            Ok(report) => Ok(report),
            Err(violation) => {
                debug!(report = R::NAME, reason = %violation.reason, "schema coercion failed, retrying once");
                progress.on_schema_retry(R::NAME);

                let retry_prompt = StagePromptTemplate::corrective_retry(R::NAME);
                let retry_text = self
                    .run_to_text(store, thread, &retry_prompt, params, progress)
                    .await?;

                match coerce::<R>(&retry_text) {
                    Ok(report) => Ok(report),
                    Err(_) => {
                        warn!(report = R::NAME, "coercion failed twice, using fallback");
                        progress.on_stage_fallback(R::NAME);
                        let raw = if retry_text.is_empty() { &text } else { &retry_text };
                        Ok(R::fallback(raw))
                    }
                }
            }
        }
    }
}

fn render_assistant_turn(text: &str, calls: &[ToolCall]) -> String {
    let names: Vec<&str> = calls.iter().map(|c| c.tool_name.as_str()).collect();
    if text.is_empty() {
        format!("[requested tools: {}]", names.join(", "))
    } else {
        format!("{}\n[requested tools: {}]", text, names.join(", "))
    }
}

fn summarize_args(call: &ToolCall) -> String {
    call.get_string("path")
        .or_else(|| call.get_string("pattern"))
        .or_else(|| call.get_string("command"))
        .unwrap_or("")
        .to_string()
}
