//! LLM gateway adapters

mod openai;

pub use openai::{GatewaySetupError, OpenAiGateway};
