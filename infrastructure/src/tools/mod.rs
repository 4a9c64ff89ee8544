//! Tool implementations
//!
//! Concrete tools the agent stages can invoke. Every filesystem-touching
//! tool resolves its paths through a [`SandboxRoot`]; anything escaping the
//! configured root fails with `OUT_OF_SANDBOX` before any I/O happens.

pub mod command;
pub mod file;
pub mod git;
pub mod lint;
pub mod search;

mod executor;
mod sandbox;

pub use executor::LocalToolExecutor;
pub use sandbox::SandboxRoot;

use triad_domain::ToolSpec;

/// The full tool specification. Stages see a capability-filtered subset of
/// this through their gate.
pub fn full_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(file::read_file_definition())
        .register(file::write_file_definition())
        .register(lint::lint_file_definition())
        .register(search::grep_search_definition())
        .register(command::run_command_definition())
        .register(git::git_diff_definition())
        .register(git::git_status_definition())
}
