//! Configuration file schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use triad_application::PipelineParams;
use triad_domain::SessionScope;

/// Top-level configuration, merged from files, environment, and CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: ModelSection,
    pub pipeline: PipelineSection,
    pub sandbox: SandboxSection,
    pub logging: LoggingSection,
}

/// `[model]`: which model to talk to and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Model name sent to the provider
    pub name: String,
    /// Base URL of the chat-completions endpoint (default: OpenAI)
    pub api_base: Option<String>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: "gpt-4o".to_string(),
            api_base: None,
        }
    }
}

/// `[pipeline]`: orchestration loop control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub max_fix_iterations: usize,
    pub max_reasoning_turns: usize,
    pub stage_timeout_secs: u64,
    pub lint_threshold: f64,
    pub session_scope: SessionScope,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            max_fix_iterations: 3,
            max_reasoning_turns: 10,
            stage_timeout_secs: 120,
            lint_threshold: 8.0,
            session_scope: SessionScope::PerStage,
        }
    }
}

/// `[sandbox]`: root directory confinement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSection {
    /// Root directory for all file operations (default: current directory)
    pub root: Option<PathBuf>,
}

/// `[logging]`: transcript output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Where to write the JSONL run transcript, if anywhere
    pub transcript: Option<PathBuf>,
}

impl FileConfig {
    /// Convert the pipeline section into application-layer parameters.
    pub fn pipeline_params(&self) -> PipelineParams {
        PipelineParams::default()
            .with_max_fix_iterations(self.pipeline.max_fix_iterations)
            .with_max_reasoning_turns(self.pipeline.max_reasoning_turns)
            .with_stage_timeout(Duration::from_secs(self.pipeline.stage_timeout_secs))
            .with_lint_threshold(self.pipeline.lint_threshold)
            .with_session_scope(self.pipeline.session_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.pipeline.max_fix_iterations, 3);
        assert!((config.pipeline.lint_threshold - 8.0).abs() < f64::EPSILON);
        assert!(config.sandbox.root.is_none());
        assert!(config.logging.transcript.is_none());
    }

    #[test]
    fn test_pipeline_params_conversion() {
        let mut config = FileConfig::default();
        config.pipeline.max_fix_iterations = 5;
        config.pipeline.stage_timeout_secs = 30;
        config.pipeline.session_scope = SessionScope::Shared;

        let params = config.pipeline_params();
        assert_eq!(params.max_fix_iterations, 5);
        assert_eq!(params.stage_timeout, Duration::from_secs(30));
        assert_eq!(params.session_scope, SessionScope::Shared);
    }

    #[test]
    fn test_parses_partial_toml() {
        let config: FileConfig = toml::from_str(
            r#"
[model]
name = "local-coder"

[pipeline]
max_fix_iterations = 1
"#,
        )
        .unwrap();
        assert_eq!(config.model.name, "local-coder");
        assert_eq!(config.pipeline.max_fix_iterations, 1);
        // Untouched sections keep their defaults
        assert_eq!(config.pipeline.max_reasoning_turns, 10);
    }
}
