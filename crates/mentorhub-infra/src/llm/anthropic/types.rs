//! Anthropic Messages API types.
//!
//! These are Anthropic-specific request/response structures used for HTTP
//! communication with the Messages API. They are NOT the generic LLM types
//! from mentorhub-types; those are provider-agnostic.

use serde::{Deserialize, Serialize};

use mentorhub_types::llm::OutputConfig;

/// Request body for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Constrains the reply to a JSON schema. Skipped when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_config: Option<AnthropicOutputConfig>,
}

/// A single message in an Anthropic conversation.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// `output_config` as the Messages API expects it: the schema sits directly
/// under `format`, without the Chat Completions `json_schema` wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicOutputConfig {
    pub format: AnthropicOutputFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicOutputFormat {
    #[serde(rename = "type")]
    pub type_field: String,
    pub schema: serde_json::Value,
}

impl From<&OutputConfig> for AnthropicOutputConfig {
    fn from(config: &OutputConfig) -> Self {
        Self {
            format: AnthropicOutputFormat {
                type_field: config.format.type_field.clone(),
                schema: config.format.json_schema.schema.clone(),
            },
        }
    }
}

/// A content block in an Anthropic response.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Token usage from Anthropic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Full response body from a non-streaming Messages API call.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    pub content: Vec<AnthropicContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: AnthropicUsage,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_serialization_skips_none() {
        let req = AnthropicRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            system: None,
            temperature: None,
            output_config: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("system").is_none());
        assert!(value.get("output_config").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_output_config_unwraps_schema() {
        let config = OutputConfig::json_schema("ModelReply", json!({"type": "object"}));
        let value = serde_json::to_value(AnthropicOutputConfig::from(&config)).unwrap();
        assert_eq!(value, json!({"format": {"type": "json_schema", "schema": {"type": "object"}}}));
    }

    #[test]
    fn test_response_ignores_unknown_blocks() {
        let resp: AnthropicResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "Hi"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 3, "output_tokens": 1}
        }))
        .unwrap();
        assert_eq!(resp.content.len(), 2);
        assert!(matches!(&resp.content[1], AnthropicContentBlock::Text { text } if text == "Hi"));
    }
}
