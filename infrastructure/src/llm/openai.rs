//! OpenAI-compatible chat-completions gateway adapter.
//!
//! Works against any endpoint speaking the `/chat/completions` protocol
//! (OpenAI, OpenRouter, local proxies). Tool definitions are rendered as
//! function schemas; tool calls in the reply come back as
//! [`ContentBlock::ToolUse`] blocks.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use triad_application::ports::llm_gateway::{GatewayError, LlmGateway};
use triad_domain::{ContentBlock, LlmResponse, Message, StopReason, ToolDefinition};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: &[&str] = &["TRIAD_API_KEY", "OPENAI_API_KEY"];

/// Setup-time gateway errors. These are process-fatal: without credentials
/// there is nothing the pipeline can recover.
#[derive(Error, Debug)]
pub enum GatewaySetupError {
    #[error("No API key found; set one of: {0}")]
    MissingApiKey(String),
}

/// Gateway adapter for OpenAI-compatible chat-completion endpoints.
pub struct OpenAiGateway {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiGateway {
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .unwrap_or_default(),
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Build a gateway from the environment. Missing credentials are a
    /// setup failure, reported before any pipeline work starts.
    pub fn from_env(
        api_base: Option<String>,
        model: Option<String>,
    ) -> Result<Self, GatewaySetupError> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| GatewaySetupError::MissingApiKey(API_KEY_VARS.join(", ")))?;
        Ok(Self::new(api_key, api_base, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render the request body for a generate call.
    fn build_request(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> serde_json::Value {
        let mut messages = vec![json!({"role": "system", "content": system_prompt})];
        for message in history {
            messages.push(json!({
                "role": message.role.as_str(),
                "content": message.content,
            }));
        }

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });

        if !tools.is_empty() {
            let tools: Vec<serde_json::Value> = tools.iter().map(to_api_tool).collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
        }

        body
    }

    /// Parse a chat-completions reply into an [`LlmResponse`].
    fn parse_response(json: &serde_json::Value) -> Result<LlmResponse, GatewayError> {
        let choice = json["choices"]
            .get(0)
            .ok_or_else(|| GatewayError::InvalidResponse("no choices in reply".to_string()))?;
        let message = &choice["message"];

        let mut content = Vec::new();
        if let Some(text) = message["content"].as_str() {
            if !text.is_empty() {
                content.push(ContentBlock::Text(text.to_string()));
            }
        }

        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                let function = &call["function"];
                let name = function["name"].as_str().unwrap_or("").to_string();
                // Arguments arrive as a JSON-encoded string
                let input: HashMap<String, serde_json::Value> = function["arguments"]
                    .as_str()
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or_default();
                content.push(ContentBlock::ToolUse {
                    id: call["id"].as_str().unwrap_or("").to_string(),
                    name,
                    input,
                });
            }
        }

        let stop_reason = match choice["finish_reason"].as_str() {
            Some("stop") => Some(StopReason::EndTurn),
            Some("tool_calls") => Some(StopReason::ToolUse),
            Some("length") => Some(StopReason::MaxTokens),
            Some(other) => Some(StopReason::Other(other.to_string())),
            None => None,
        };

        Ok(LlmResponse {
            content,
            stop_reason,
        })
    }
}

/// Render a [`ToolDefinition`] as an OpenAI function schema.
fn to_api_tool(def: &ToolDefinition) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for param in &def.parameters {
        let json_type = match param.param_type.as_str() {
            "number" => "number",
            "boolean" => "boolean",
            _ => "string",
        };
        properties.insert(
            param.name.clone(),
            json!({"type": json_type, "description": param.description}),
        );
        if param.required {
            required.push(param.name.clone());
        }
    }

    json!({
        "type": "function",
        "function": {
            "name": def.name,
            "description": def.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        }
    })
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, GatewayError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request(system_prompt, history, tools);
        debug!(model = %self.model, messages = history.len(), "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(GatewayError::RateLimited);
        }
        if status.as_u16() == 408 {
            return Err(GatewayError::Timeout);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::ModelError(format!(
                "HTTP {}: {}",
                status,
                detail.chars().take(300).collect::<String>()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Self::parse_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triad_domain::ToolParameter;

    fn gateway() -> OpenAiGateway {
        OpenAiGateway::new("test-key", None, Some("test-model".to_string()))
    }

    #[test]
    fn test_build_request_shape() {
        let history = vec![Message::user("hello")];
        let tools = vec![
            ToolDefinition::new("read_file", "Read a file").with_parameter(
                ToolParameter::new("path", "File path", true).with_type("path"),
            ),
        ];

        let body = gateway().build_request("be helpful", &history, &tools);

        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be helpful");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["tool_choice"], "auto");
        let function = &body["tools"][0]["function"];
        assert_eq!(function["name"], "read_file");
        assert_eq!(function["parameters"]["required"][0], "path");
        assert_eq!(function["parameters"]["properties"]["path"]["type"], "string");
    }

    #[test]
    fn test_build_request_without_tools() {
        let body = gateway().build_request("sys", &[], &[]);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_parse_text_response() {
        let reply = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello there"},
                "finish_reason": "stop"
            }]
        });
        let response = OpenAiGateway::parse_response(&reply).unwrap();
        assert_eq!(response.text_content(), "Hello there");
        assert!(!response.has_tool_calls());
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
    }

    #[test]
    fn test_parse_tool_call_response() {
        let reply = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "read_file",
                            "arguments": "{\"path\": \"src/app.py\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response = OpenAiGateway::parse_response(&reply).unwrap();
        assert!(response.has_tool_calls());
        let calls = response.tool_calls();
        assert_eq!(calls[0].tool_name, "read_file");
        assert_eq!(calls[0].get_string("path"), Some("src/app.py"));
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
    }

    #[test]
    fn test_parse_empty_reply_is_invalid() {
        let reply = json!({"choices": []});
        assert!(matches!(
            OpenAiGateway::parse_response(&reply),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_from_env_missing_key() {
        // Ensure neither variable leaks in from the test environment
        unsafe {
            std::env::remove_var("TRIAD_API_KEY");
            std::env::remove_var("OPENAI_API_KEY");
        }
        let result = OpenAiGateway::from_env(None, None);
        assert!(matches!(result, Err(GatewaySetupError::MissingApiKey(_))));
    }
}
