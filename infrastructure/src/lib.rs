//! Infrastructure layer for triad
//!
//! Concrete adapters for the application ports: sandboxed local tools, the
//! OpenAI-compatible HTTP gateway, the figment-based configuration loader,
//! and the JSONL transcript logger.

pub mod config;
pub mod llm;
pub mod logging;
pub mod tools;

pub use config::{ConfigLoader, FileConfig};
pub use llm::{GatewaySetupError, OpenAiGateway};
pub use logging::{TranscriptLogger, TranscriptProgress};
pub use tools::{LocalToolExecutor, SandboxRoot};
