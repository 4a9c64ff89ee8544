//! Progress reporting for pipeline execution

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use triad_application::ports::progress::PipelineProgress;
use triad_domain::{PipelinePhase, StageRole};

/// Reports progress with a spinner per pipeline phase
pub struct ConsoleProgress {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineProgress for ConsoleProgress {
    fn on_phase_change(&self, phase: &PipelinePhase) {
        let mut guard = self.phase_bar.lock().unwrap();
        if let Some(bar) = guard.take() {
            bar.finish_and_clear();
        }

        if phase.is_terminal() {
            let label = match phase {
                PipelinePhase::Approved => phase.display_name().green().bold().to_string(),
                _ => phase.display_name().yellow().bold().to_string(),
            };
            let _ = self.multi.println(label);
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::spinner_style());
        bar.set_prefix(phase.display_name().to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        *guard = Some(bar);
    }

    fn on_llm_turn(&self, role: &StageRole, turn: usize) {
        if let Some(bar) = self.phase_bar.lock().unwrap().as_ref() {
            bar.set_message(format!("{} thinking (turn {})", role.display_name(), turn));
        }
    }

    fn on_tool_call(&self, tool: &str, summary: &str) {
        if let Some(bar) = self.phase_bar.lock().unwrap().as_ref() {
            if summary.is_empty() {
                bar.set_message(format!("tool: {}", tool));
            } else {
                bar.set_message(format!("tool: {} -> {}", tool, summary));
            }
        }
    }

    fn on_tool_result(&self, tool: &str, success: bool) {
        if let Some(bar) = self.phase_bar.lock().unwrap().as_ref() {
            let mark = if success { "ok" } else { "failed" };
            bar.set_message(format!("tool: {} {}", tool, mark));
        }
    }

    fn on_fix_iteration(&self, iteration: usize, max: usize, instructions: &[String]) {
        let header = format!("Fix iteration {}/{}", iteration, max)
            .yellow()
            .to_string();
        let _ = self.multi.println(header);
        for instruction in instructions.iter().take(5) {
            let _ = self.multi.println(format!("  - {}", instruction));
        }
    }

    fn on_schema_retry(&self, report: &str) {
        let _ = self
            .multi
            .println(format!("  retrying: {} output was malformed", report).dimmed().to_string());
    }

    fn on_stage_fallback(&self, report: &str) {
        let _ = self
            .multi
            .println(format!("  warning: using fallback {}", report).dimmed().to_string());
    }
}

/// Plain line-based progress (no spinner), for dumb terminals
pub struct SimpleProgress;

impl PipelineProgress for SimpleProgress {
    fn on_phase_change(&self, phase: &PipelinePhase) {
        println!("[{}]", phase.display_name());
    }

    fn on_tool_call(&self, tool: &str, summary: &str) {
        if summary.is_empty() {
            println!("  tool: {}", tool);
        } else {
            println!("  tool: {} -> {}", tool, summary);
        }
    }

    fn on_fix_iteration(&self, iteration: usize, max: usize, _instructions: &[String]) {
        println!("[Fix iteration {}/{}]", iteration, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_changes_do_not_panic() {
        let progress = ConsoleProgress::new();
        for phase in [
            PipelinePhase::Planning,
            PipelinePhase::Implementing,
            PipelinePhase::Validating,
            PipelinePhase::Fixing,
            PipelinePhase::Approved,
        ] {
            progress.on_phase_change(&phase);
        }
        progress.on_llm_turn(&StageRole::Planner, 1);
        progress.on_tool_call("read_file", "src/app.py");
        progress.on_tool_result("read_file", true);
    }
}
