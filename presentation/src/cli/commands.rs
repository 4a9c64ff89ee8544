//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for pipeline results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Raw JSON of the aggregated result
    Json,
}

/// CLI arguments for triad
#[derive(Parser, Debug)]
#[command(name = "triad")]
#[command(author, version, about = "Coding agent with a plan / implement / validate pipeline")]
#[command(long_about = r#"
Triad wraps a hosted LLM in a tool-using coding agent.

By default a single agent handles the request. With --multi-agent the
request runs through a three-stage pipeline:

1. Planning    (read-only)       analyzes the codebase and produces a plan
2. Implementing (read-write)     executes the plan, linting as it goes
3. Validating  (read-only + git) reviews the diff and approves or requests
                                 fixes; rejected work is retried up to the
                                 fix-iteration budget

Configuration files are loaded from (in priority order):
1. --config <path>    Explicit config file
2. ./triad.toml       Project-level config
3. ~/.config/triad/config.toml   Global config

The API key is read from TRIAD_API_KEY (or OPENAI_API_KEY).

Examples:
  triad "explain what src/app.py does"
  triad --multi-agent "create hello.py printing Hello World"
  triad --multi-agent --root ~/work/project -m gpt-4o "add input validation"
"#)]
pub struct Cli {
    /// The coding request
    pub request: Option<String>,

    /// Run the multi-agent plan / implement / validate pipeline
    #[arg(long)]
    pub multi_agent: bool,

    /// Working directory the agent is confined to (default: current dir)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Model to use
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum fix iterations in the multi-agent pipeline
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_single_request() {
        let cli = Cli::parse_from(["triad", "do the thing"]);
        assert_eq!(cli.request.as_deref(), Some("do the thing"));
        assert!(!cli.multi_agent);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parses_multi_agent_flags() {
        let cli = Cli::parse_from([
            "triad",
            "--multi-agent",
            "--root",
            "/tmp/work",
            "-m",
            "gpt-4o",
            "--max-iterations",
            "5",
            "-vv",
            "fix the bug",
        ]);
        assert!(cli.multi_agent);
        assert_eq!(cli.root.as_deref(), Some(std::path::Path::new("/tmp/work")));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.max_iterations, Some(5));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_request_is_optional_for_show_config() {
        let cli = Cli::parse_from(["triad", "--show-config"]);
        assert!(cli.show_config);
        assert!(cli.request.is_none());
    }
}
