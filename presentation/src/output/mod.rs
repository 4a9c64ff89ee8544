//! Output formatting

mod console;

pub use console::ConsoleFormatter;
