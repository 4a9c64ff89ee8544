//! LLM Gateway port
//!
//! The one interface through which stages reach the hosted model. The
//! gateway is stateless: conversation history lives in the caller's
//! [`ThreadStore`](triad_domain::ThreadStore) and is passed in on every
//! call, so session memory is never hidden inside an adapter.

use async_trait::async_trait;
use thiserror::Error;
use triad_domain::{LlmResponse, Message, ToolDefinition};

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Rate limited by the model provider")]
    RateLimited,

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),
}

/// Gateway for LLM generation.
///
/// Called multiple times per stage invocation: once per reasoning turn.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate the next turn given the system prompt, the conversation
    /// history, and the tools the stage is allowed to expose.
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, GatewayError>;
}
