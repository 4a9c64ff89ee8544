//! Pipeline progress notification port

use std::sync::Arc;
use triad_domain::{PipelinePhase, StageRole};

/// Receives progress callbacks during pipeline execution.
///
/// All methods have empty defaults so implementations only override what
/// they present.
pub trait PipelineProgress: Send + Sync {
    fn on_phase_change(&self, _phase: &PipelinePhase) {}

    fn on_stage_start(&self, _role: &StageRole) {}

    fn on_stage_complete(&self, _role: &StageRole, _success: bool) {}

    fn on_llm_turn(&self, _role: &StageRole, _turn: usize) {}

    fn on_tool_call(&self, _tool: &str, _summary: &str) {}

    fn on_tool_result(&self, _tool: &str, _success: bool) {}

    fn on_fix_iteration(&self, _iteration: usize, _max: usize, _instructions: &[String]) {}

    /// Stage output failed schema coercion; a corrective retry is being sent.
    fn on_schema_retry(&self, _report: &str) {}

    /// Both coercion attempts failed; a typed fallback report is used.
    fn on_stage_fallback(&self, _report: &str) {}
}

/// No-op progress for quiet execution.
pub struct NoProgress;

impl PipelineProgress for NoProgress {}

/// Fans progress callbacks out to several receivers (e.g. console +
/// transcript logger).
pub struct CompositeProgress {
    receivers: Vec<Arc<dyn PipelineProgress>>,
}

impl CompositeProgress {
    pub fn new(receivers: Vec<Arc<dyn PipelineProgress>>) -> Self {
        Self { receivers }
    }
}

impl PipelineProgress for CompositeProgress {
    fn on_phase_change(&self, phase: &PipelinePhase) {
        for r in &self.receivers {
            r.on_phase_change(phase);
        }
    }

    fn on_stage_start(&self, role: &StageRole) {
        for r in &self.receivers {
            r.on_stage_start(role);
        }
    }

    fn on_stage_complete(&self, role: &StageRole, success: bool) {
        for r in &self.receivers {
            r.on_stage_complete(role, success);
        }
    }

    fn on_llm_turn(&self, role: &StageRole, turn: usize) {
        for r in &self.receivers {
            r.on_llm_turn(role, turn);
        }
    }

    fn on_tool_call(&self, tool: &str, summary: &str) {
        for r in &self.receivers {
            r.on_tool_call(tool, summary);
        }
    }

    fn on_tool_result(&self, tool: &str, success: bool) {
        for r in &self.receivers {
            r.on_tool_result(tool, success);
        }
    }

    fn on_fix_iteration(&self, iteration: usize, max: usize, instructions: &[String]) {
        for r in &self.receivers {
            r.on_fix_iteration(iteration, max, instructions);
        }
    }

    fn on_schema_retry(&self, report: &str) {
        for r in &self.receivers {
            r.on_schema_retry(report);
        }
    }

    fn on_stage_fallback(&self, report: &str) {
        for r in &self.receivers {
            r.on_stage_fallback(report);
        }
    }
}
