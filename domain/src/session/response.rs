//! LLM response types.
//!
//! A gateway response is an array of content blocks mixing text and tool-use
//! requests, mirroring how tool-capable provider APIs answer. The reasoning
//! loop acts on the tool-use blocks and treats a block-free response as the
//! stage's final answer.

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single block of content within an LLM response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A text content block from the model.
    Text(String),

    /// A tool invocation request from the model.
    ToolUse {
        /// Provider-assigned id for the call
        id: String,
        /// Tool name as requested by the model
        name: String,
        /// Structured arguments
        input: HashMap<String, serde_json::Value>,
    },
}

impl ContentBlock {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tool_use(&self) -> Option<(&str, &str, &HashMap<String, serde_json::Value>)> {
        match self {
            ContentBlock::ToolUse { id, name, input } => Some((id, name, input)),
            _ => None,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response.
    EndTurn,
    /// The model wants tools executed and results returned.
    ToolUse,
    /// Token limit reached; the response may be truncated.
    MaxTokens,
    /// Provider-specific stop reason.
    Other(String),
}

/// A structured response from an LLM.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Content blocks (text and/or tool use)
    pub content: Vec<ContentBlock>,
    /// Why the model stopped
    pub stop_reason: Option<StopReason>,
}

impl LlmResponse {
    /// Wrap a plain text response.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
            stop_reason: Some(StopReason::EndTurn),
        }
    }

    /// Concatenate all text blocks.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Extract tool-use blocks as [`ToolCall`]s, in order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|b| b.as_tool_use())
            .map(|(_, name, input)| {
                let mut call = ToolCall::new(name);
                for (key, value) in input {
                    call = call.with_arg(key, value.clone());
                }
                call
            })
            .collect()
    }

    pub fn has_tool_calls(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let response = LlmResponse::from_text("Hello!");
        assert_eq!(response.text_content(), "Hello!");
        assert!(!response.has_tool_calls());
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
    }

    #[test]
    fn test_mixed_blocks() {
        let response = LlmResponse {
            content: vec![
                ContentBlock::Text("Reading file...".to_string()),
                ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "read_file".to_string(),
                    input: [("path".to_string(), serde_json::json!("README.md"))]
                        .into_iter()
                        .collect(),
                },
            ],
            stop_reason: Some(StopReason::ToolUse),
        };

        assert!(response.has_tool_calls());
        assert_eq!(response.text_content(), "Reading file...");

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "read_file");
        assert_eq!(calls[0].get_string("path"), Some("README.md"));
    }
}
