//! JSONL transcript writer for pipeline runs.
//!
//! Each event is one JSON line with a `type` field and a `timestamp`,
//! appended through a buffered writer. Thread-safe via a mutex; flushed on
//! every write so a crash loses at most the current line, and again on drop.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;
use triad_application::ports::progress::PipelineProgress;
use triad_domain::{PipelinePhase, StageRole};

/// JSONL transcript logger writing one JSON object per line.
pub struct TranscriptLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl TranscriptLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created: transcript logging is
    /// best-effort and never blocks a run.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(
                    "Could not create transcript directory {}: {}",
                    parent.display(),
                    e
                );
                return None;
            }
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create transcript file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event line.
    pub fn log(&self, event_type: &str, payload: serde_json::Value) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = if let serde_json::Value::Object(mut map) = payload {
            map.insert("type".to_string(), serde_json::json!(event_type));
            map.insert("timestamp".to_string(), serde_json::json!(timestamp));
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event_type,
                "timestamp": timestamp,
                "data": payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for TranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

/// Progress adapter that records pipeline events into a transcript.
pub struct TranscriptProgress {
    logger: Arc<TranscriptLogger>,
}

impl TranscriptProgress {
    pub fn new(logger: Arc<TranscriptLogger>) -> Self {
        Self { logger }
    }
}

impl PipelineProgress for TranscriptProgress {
    fn on_phase_change(&self, phase: &PipelinePhase) {
        self.logger
            .log("phase_change", serde_json::json!({"phase": phase.as_str()}));
    }

    fn on_stage_start(&self, role: &StageRole) {
        self.logger
            .log("stage_start", serde_json::json!({"role": role.as_str()}));
    }

    fn on_stage_complete(&self, role: &StageRole, success: bool) {
        self.logger.log(
            "stage_complete",
            serde_json::json!({"role": role.as_str(), "success": success}),
        );
    }

    fn on_tool_call(&self, tool: &str, summary: &str) {
        self.logger.log(
            "tool_call",
            serde_json::json!({"tool": tool, "summary": summary}),
        );
    }

    fn on_tool_result(&self, tool: &str, success: bool) {
        self.logger.log(
            "tool_result",
            serde_json::json!({"tool": tool, "success": success}),
        );
    }

    fn on_fix_iteration(&self, iteration: usize, max: usize, instructions: &[String]) {
        self.logger.log(
            "fix_iteration",
            serde_json::json!({
                "iteration": iteration,
                "max": max,
                "instructions": instructions,
            }),
        );
    }

    fn on_schema_retry(&self, report: &str) {
        self.logger
            .log("schema_retry", serde_json::json!({"report": report}));
    }

    fn on_stage_fallback(&self, report: &str) {
        self.logger
            .log("stage_fallback", serde_json::json!({"report": report}));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let logger = TranscriptLogger::new(&path).unwrap();

        logger.log("phase_change", serde_json::json!({"phase": "planning"}));
        logger.log("tool_call", serde_json::json!({"tool": "read_file"}));
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value["type"].is_string());
            assert!(value["timestamp"].is_string());
        }
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/run.jsonl");
        let logger = TranscriptLogger::new(&path);
        assert!(logger.is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_progress_adapter_records_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let logger = Arc::new(TranscriptLogger::new(&path).unwrap());
        let progress = TranscriptProgress::new(logger);

        progress.on_phase_change(&PipelinePhase::Planning);
        progress.on_fix_iteration(1, 3, &["fix the import".to_string()]);
        drop(progress);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"phase\":\"planning\""));
        assert!(content.contains("fix the import"));
    }
}
