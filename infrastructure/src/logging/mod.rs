//! Run transcript logging

mod transcript;

pub use transcript::{TranscriptLogger, TranscriptProgress};
