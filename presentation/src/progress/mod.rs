//! Terminal progress reporting

mod reporter;

pub use reporter::{ConsoleProgress, SimpleProgress};
