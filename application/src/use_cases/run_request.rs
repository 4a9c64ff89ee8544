//! Run Request use case: single-agent mode.
//!
//! One generalist read-write agent handles the request end to end, without
//! the plan / implement / validate split. This is the default CLI path; the
//! `--multi-agent` flag selects the pipeline instead.

use crate::config::PipelineParams;
use crate::gate::CapabilityGate;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::run_pipeline::PipelineError;
use crate::use_cases::run_stage::StageRunner;
use crate::use_cases::shared::check_cancelled;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use triad_domain::{
    Capability, StagePromptTemplate, StageRole, ThreadId, ThreadStore,
};

/// Input for the single-request use case
#[derive(Debug, Clone)]
pub struct RunRequestInput {
    /// The user's request
    pub request: String,
    /// Execution parameters (reasoning turn budget, timeouts)
    pub params: PipelineParams,
}

impl RunRequestInput {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            params: PipelineParams::default(),
        }
    }

    pub fn with_params(mut self, params: PipelineParams) -> Self {
        self.params = params;
        self
    }
}

/// Output of the single-request use case
#[derive(Debug, Clone)]
pub struct RunRequestOutput {
    /// The agent's final answer
    pub answer: String,
    /// Whether the agent finished without a stage-level failure
    pub success: bool,
}

/// Use case for the single-agent request mode.
pub struct RunRequestUseCase<G: LlmGateway + 'static, T: ToolExecutorPort + 'static> {
    gateway: Arc<G>,
    tool_executor: Arc<T>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: LlmGateway + 'static, T: ToolExecutorPort + 'static> RunRequestUseCase<G, T> {
    pub fn new(gateway: Arc<G>, tool_executor: Arc<T>) -> Self {
        Self {
            gateway,
            tool_executor,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub async fn execute(
        &self,
        input: RunRequestInput,
    ) -> Result<RunRequestOutput, PipelineError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: RunRequestInput,
        progress: &dyn PipelineProgress,
    ) -> Result<RunRequestOutput, PipelineError> {
        check_cancelled(&self.cancellation_token)?;
        info!(request = %input.request, "starting single-agent request");

        let gate = Arc::new(CapabilityGate::new(
            self.tool_executor.clone(),
            Capability::ReadWrite,
        ));
        let system_prompt = StagePromptTemplate::single_agent_system(gate.tool_spec());
        let runner = StageRunner::new(StageRole::Implementer, self.gateway.clone(), gate)
            .with_system_prompt(system_prompt);

        let mut store = ThreadStore::new();
        let thread = ThreadId::from("chat");

        match runner
            .run_to_text(&mut store, &thread, &input.request, &input.params, progress)
            .await
        {
            Ok(answer) => Ok(RunRequestOutput {
                answer,
                success: true,
            }),
            Err(e) => {
                // Stage failures are reported, not escalated: the CLI exits
                // non-zero only on setup errors.
                warn!(error = %e, "single-agent request failed");
                Ok(RunRequestOutput {
                    answer: format!("Request failed: {}", e),
                    success: false,
                })
            }
        }
    }
}
