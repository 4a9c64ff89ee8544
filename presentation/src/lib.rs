//! Presentation layer for triad
//!
//! CLI argument definitions, console output formatting, and terminal
//! progress reporting.

pub mod cli;
pub mod output;
pub mod progress;

pub use cli::{Cli, OutputFormat};
pub use output::ConsoleFormatter;
pub use progress::{ConsoleProgress, SimpleProgress};
