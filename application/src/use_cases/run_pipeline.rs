//! Run Pipeline use case: the orchestrator and its fix loop.
//!
//! Sequences Planning → Implementation → Validation, then loops
//! Implementation ⇄ Validation with extracted fix instructions while the
//! validator rejects and the iteration budget holds:
//!
//! | Transition | When |
//! |------------|------|
//! | Planning → Implementing | always, passing the plan |
//! | Implementing → Validating | always, passing the report |
//! | Validating → Approved | approval = true (terminal) |
//! | Validating → Fixing | approval = false, iterations < max |
//! | Fixing → Implementing | always, same implementation thread |
//! | Validating → NeedsReview | approval = false, budget spent (terminal, not an error) |
//!
//! Stage-level failures (timeout, gateway error, capability violation) are
//! consumed as a synthesized non-approved validation report and count
//! against the same iteration budget. The orchestrator never reverts file
//! changes: on exhaustion the last implementation's side effects persist
//! and the result is flagged `needs_review`.

use crate::config::PipelineParams;
use crate::gate::CapabilityGate;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::run_stage::StageRunner;
use crate::use_cases::shared::check_cancelled;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use triad_domain::{
    ImplementationReport, PipelineOutcome, PipelinePhase, PipelineState, Plan, RunStatus,
    SessionScope, StagePromptTemplate, StageReport, StageRole, ThreadId, ThreadStore,
    ValidationReport,
};

/// Errors that abort the whole pipeline.
///
/// Almost nothing does: stage failures feed the fix loop and budget
/// exhaustion is a `needs_review` outcome. Only an external cancellation
/// signal stops the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Operation cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}

/// Input for the pipeline use case
#[derive(Debug, Clone)]
pub struct RunPipelineInput {
    /// The user's coding request
    pub request: String,
    /// Execution parameters
    pub params: PipelineParams,
}

impl RunPipelineInput {
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

/// Use case for running the multi-agent pipeline.
pub struct RunPipelineUseCase<G: LlmGateway + 'static, T: ToolExecutorPort + 'static> {
    gateway: Arc<G>,
    tool_executor: Arc<T>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: LlmGateway + 'static, T: ToolExecutorPort + 'static> RunPipelineUseCase<G, T> {
    pub fn new(gateway: Arc<G>, tool_executor: Arc<T>) -> Self {
        Self {
            gateway,
            tool_executor,
            cancellation_token: None,
        }
    }

    /// Set a cancellation token checked between stage transitions.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the pipeline without progress reporting.
    pub async fn execute(&self, input: RunPipelineInput) -> Result<PipelineOutcome, PipelineError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the pipeline with progress callbacks.
    pub async fn execute_with_progress(
        &self,
        input: RunPipelineInput,
        progress: &dyn PipelineProgress,
    ) -> Result<PipelineOutcome, PipelineError> {
        let params = &input.params;
        info!(request = %input.request, "starting multi-agent pipeline");

        let planner = self.stage(StageRole::Planner);
        let implementer = self.stage(StageRole::Implementer);
        let validator = self.stage(StageRole::Validator);

        // Session memory: created here, owned by the orchestrator, passed by
        // reference into every stage invocation, dropped when the run ends.
        let mut store = ThreadStore::new();
        let plan_thread = thread_for(params.session_scope, StageRole::Planner);
        let impl_thread = thread_for(params.session_scope, StageRole::Implementer);
        let validation_thread = thread_for(params.session_scope, StageRole::Validator);

        let mut state = PipelineState::new(params.max_fix_iterations);

        // ==================== Planning ====================
        check_cancelled(&self.cancellation_token)?;
        progress.on_phase_change(&PipelinePhase::Planning);
        state.set_phase(PipelinePhase::Planning);

        let plan = match planner
            .invoke::<Plan>(
                &mut store,
                &plan_thread,
                &StagePromptTemplate::planning_request(&input.request),
                params,
                progress,
            )
            .await
        {
            Ok(plan) => plan,
            Err(e) => {
                // There is no fix loop to recover a planning failure, so the
                // pipeline proceeds with a fallback plan; the validator will
                // reject the resulting implementation and surface the
                // problem in the final report.
                warn!(error = %e, "planning stage failed, continuing with fallback plan");
                Plan::fallback(&format!("Planning stage failed: {}", e))
            }
        };
        for violation in plan.check_invariants() {
            warn!(violation = %violation, "plan invariant violated");
        }

        // ==================== Implementation ====================
        check_cancelled(&self.cancellation_token)?;
        progress.on_phase_change(&PipelinePhase::Implementing);
        state.set_phase(PipelinePhase::Implementing);

        let plan_json = serde_json::to_string_pretty(&plan).unwrap_or_default();
        let mut stage_failure: Option<String> = None;

        let mut implementation = match implementer
            .invoke::<ImplementationReport>(
                &mut store,
                &impl_thread,
                &StagePromptTemplate::implementation_request(&plan_json),
                params,
                progress,
            )
            .await
        {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "implementation stage failed");
                stage_failure = Some(e.to_string());
                ImplementationReport::failed(format!("Implementation stage failed: {}", e))
            }
        };

        // ==================== Validation ====================
        let mut validation = if let Some(reason) = stage_failure.take() {
            ValidationReport::from_stage_failure(reason)
        } else {
            check_cancelled(&self.cancellation_token)?;
            self.validate(
                &validator,
                &mut store,
                &validation_thread,
                &implementation,
                &mut state,
                params,
                progress,
                false,
            )
            .await?
        };

        // ==================== Fix loop ====================
        while !validation.is_approved() && state.start_fix_iteration() {
            check_cancelled(&self.cancellation_token)?;
            progress.on_phase_change(&PipelinePhase::Fixing);
            state.set_phase(PipelinePhase::Fixing);

            let instructions = validation.fix_instructions();
            progress.on_fix_iteration(
                state.fix_iterations,
                state.max_fix_iterations,
                &instructions,
            );
            info!(
                iteration = state.fix_iterations,
                max = state.max_fix_iterations,
                "re-entering implementation with fix instructions"
            );

            progress.on_phase_change(&PipelinePhase::Implementing);
            state.set_phase(PipelinePhase::Implementing);

            // Same implementation thread: the fix round continues the
            // conversation instead of starting from scratch.
            match implementer
                .invoke::<ImplementationReport>(
                    &mut store,
                    &impl_thread,
                    &StagePromptTemplate::fix_request(&instructions),
                    params,
                    progress,
                )
                .await
            {
                Ok(report) => {
                    implementation = report;
                    check_cancelled(&self.cancellation_token)?;
                    validation = self
                        .validate(
                            &validator,
                            &mut store,
                            &validation_thread,
                            &implementation,
                            &mut state,
                            params,
                            progress,
                            true,
                        )
                        .await?;
                }
                Err(e) => {
                    // The prior implementation artifact is kept as-is; the
                    // failure is consumed as a rejecting validation.
                    warn!(error = %e, "fix-round implementation failed");
                    validation = ValidationReport::from_stage_failure(e.to_string());
                }
            }
        }

        // ==================== Terminal ====================
        let status = if validation.is_approved() {
            state.set_phase(PipelinePhase::Approved);
            RunStatus::Approved
        } else {
            state.set_phase(PipelinePhase::NeedsReview);
            RunStatus::NeedsReview
        };
        progress.on_phase_change(&state.phase);
        info!(status = %status, fix_iterations = state.fix_iterations, "pipeline finished");

        Ok(PipelineOutcome {
            plan,
            implementation,
            validation,
            status,
            fix_iterations: state.fix_iterations,
        })
    }

    fn stage(&self, role: StageRole) -> StageRunner<G, T> {
        let gate = Arc::new(CapabilityGate::new(
            self.tool_executor.clone(),
            role.capability(),
        ));
        StageRunner::new(role, self.gateway.clone(), gate)
    }

    #[allow(clippy::too_many_arguments)]
    async fn validate(
        &self,
        validator: &StageRunner<G, T>,
        store: &mut ThreadStore,
        thread: &ThreadId,
        implementation: &ImplementationReport,
        state: &mut PipelineState,
        params: &PipelineParams,
        progress: &dyn PipelineProgress,
        revalidation: bool,
    ) -> Result<ValidationReport, PipelineError> {
        progress.on_phase_change(&PipelinePhase::Validating);
        state.set_phase(PipelinePhase::Validating);

        let report_json = serde_json::to_string_pretty(implementation).unwrap_or_default();
        let request = if revalidation {
            StagePromptTemplate::revalidation_request(&report_json)
        } else {
            StagePromptTemplate::validation_request(&report_json)
        };

        let validation = match validator
            .invoke::<ValidationReport>(store, thread, &request, params, progress)
            .await
        {
            Ok(report) => report.normalized(),
            Err(e) => {
                warn!(error = %e, "validation stage failed");
                ValidationReport::from_stage_failure(e.to_string())
            }
        };

        for violation in implementation.check_invariants(params.lint_threshold) {
            warn!(violation = %violation, "implementation invariant violated");
        }

        Ok(validation)
    }
}

fn thread_for(scope: SessionScope, role: StageRole) -> ThreadId {
    match scope {
        SessionScope::PerStage => ThreadId::from(role.default_thread()),
        SessionScope::Shared => ThreadId::from("pipeline"),
    }
}
