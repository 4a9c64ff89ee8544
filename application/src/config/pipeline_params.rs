//! Pipeline execution parameters: loop control for the orchestrator and
//! the per-stage reasoning loop.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use triad_domain::SessionScope;

/// Static parameters controlling pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Maximum fix iterations (Implementation ⇄ Validation rounds after the
    /// first pass).
    pub max_fix_iterations: usize,
    /// Maximum reasoning turns inside a single stage invocation.
    pub max_reasoning_turns: usize,
    /// Timeout for each gateway call inside a stage.
    pub stage_timeout: Duration,
    /// Lint score below which a file blocks a `success` status.
    pub lint_threshold: f64,
    /// How conversation threads are shared across stages.
    pub session_scope: SessionScope,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            max_fix_iterations: 3,
            max_reasoning_turns: 10,
            stage_timeout: Duration::from_secs(120),
            lint_threshold: 8.0,
            session_scope: SessionScope::PerStage,
        }
    }
}

impl PipelineParams {
    // ==================== Builder Methods ====================

    pub fn with_max_fix_iterations(mut self, max: usize) -> Self {
        self.max_fix_iterations = max;
        self
    }

    pub fn with_max_reasoning_turns(mut self, max: usize) -> Self {
        self.max_reasoning_turns = max;
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn with_lint_threshold(mut self, threshold: f64) -> Self {
        self.lint_threshold = threshold;
        self
    }

    pub fn with_session_scope(mut self, scope: SessionScope) -> Self {
        self.session_scope = scope;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PipelineParams::default();
        assert_eq!(params.max_fix_iterations, 3);
        assert_eq!(params.max_reasoning_turns, 10);
        assert_eq!(params.stage_timeout, Duration::from_secs(120));
        assert!((params.lint_threshold - 8.0).abs() < f64::EPSILON);
        assert_eq!(params.session_scope, SessionScope::PerStage);
    }

    #[test]
    fn test_builder() {
        let params = PipelineParams::default()
            .with_max_fix_iterations(5)
            .with_stage_timeout(Duration::from_secs(10))
            .with_session_scope(SessionScope::Shared);

        assert_eq!(params.max_fix_iterations, 5);
        assert_eq!(params.stage_timeout, Duration::from_secs(10));
        assert_eq!(params.session_scope, SessionScope::Shared);
    }
}
