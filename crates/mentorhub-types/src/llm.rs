//! LLM request/response types for Mentor Hub.
//!
//! These types model the data shapes for the model-call boundary:
//! completion requests, structured output configuration, usage tracking,
//! and the provider error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message on the LLM wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request to an LLM provider for a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Structured output configuration. When present, the provider is asked
    /// to constrain its reply to the given JSON schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_config: Option<OutputConfig>,
}

/// Structured output configuration attached to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// The output format block: always `"json_schema"` for now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputFormat {
    #[serde(rename = "type")]
    pub type_field: String,
    pub json_schema: OutputJsonSchema,
}

/// A named JSON schema describing the expected reply shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputJsonSchema {
    pub name: String,
    pub schema: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl OutputConfig {
    /// Build a strict `json_schema` output config from a schema value.
    pub fn json_schema(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            format: OutputFormat {
                type_field: "json_schema".to_string(),
                json_schema: OutputJsonSchema {
                    name: name.into(),
                    schema,
                    strict: Some(true),
                },
            },
        }
    }
}

/// Recursively set `additionalProperties: false` on every object schema.
///
/// Strict structured-output modes reject object schemas that leave
/// additional properties open.
pub fn add_additional_properties_false(schema: &mut serde_json::Value) {
    match schema {
        serde_json::Value::Object(map) => {
            if map.get("type").and_then(|t| t.as_str()) == Some("object") {
                map.insert(
                    "additionalProperties".to_string(),
                    serde_json::Value::Bool(false),
                );
            }
            for value in map.values_mut() {
                add_additional_properties_false(value);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                add_additional_properties_false(item);
            }
        }
        _ => {}
    }
}

/// Response from an LLM provider for a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

/// Reason why the LLM stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    ContentFilter,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EndTurn => write!(f, "end_turn"),
            StopReason::MaxTokens => write!(f, "max_tokens"),
            StopReason::StopSequence => write!(f, "stop_sequence"),
            StopReason::ContentFilter => write!(f, "content_filter"),
        }
    }
}

/// Token usage for a completion request/response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from LLM provider operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Capabilities of an LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Whether the provider enforces a JSON schema on its reply.
    pub structured_output: bool,
    pub max_context_tokens: u32,
    pub max_output_tokens: u32,
}

/// Type of LLM provider backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    Anthropic,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::OpenAiCompatible => write!(f, "openai_compatible"),
            ProviderType::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai_compatible" => Ok(ProviderType::OpenAiCompatible),
            "anthropic" => Ok(ProviderType::Anthropic),
            other => Err(format!("invalid provider type: '{other}'")),
        }
    }
}

/// Configuration for the LLM provider behind every flow and assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Human-readable name (e.g., "gemini", "openai", "anthropic").
    #[serde(default = "default_provider_name")]
    pub name: String,
    /// Backend type for this provider.
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,
    /// Model identifier to use.
    #[serde(default = "default_model")]
    pub model: String,
    /// Override the default base URL for the provider.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_provider_name() -> String {
    "gemini".to_string()
}

fn default_provider_type() -> ProviderType {
    ProviderType::OpenAiCompatible
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            provider_type: default_provider_type(),
            model: default_model(),
            base_url: None,
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_display_and_parse() {
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
        assert_eq!("USER".parse::<MessageRole>().unwrap(), MessageRole::User);
        assert!("moderator".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_completion_request_skips_empty_optionals() {
        let req = CompletionRequest {
            model: "gemini-2.5-flash".to_string(),
            messages: vec![Message::user("hi")],
            system: None,
            max_tokens: 128,
            temperature: None,
            output_config: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("temperature").is_none());
        assert!(json.get("output_config").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_output_config_serializes_type_field() {
        let config = OutputConfig::json_schema("Reply", serde_json::json!({"type": "object"}));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["format"]["type"], "json_schema");
        assert_eq!(json["format"]["json_schema"]["name"], "Reply");
        assert_eq!(json["format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_add_additional_properties_false_nested() {
        let mut schema = serde_json::json!({
            "type": "object",
            "properties": {
                "inner": { "type": "object", "properties": {} },
                "name": { "type": "string" }
            }
        });
        add_additional_properties_false(&mut schema);
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["properties"]["inner"]["additionalProperties"], false);
        assert!(schema["properties"]["name"].get("additionalProperties").is_none());
    }

    #[test]
    fn test_provider_type_roundtrip() {
        for pt in [ProviderType::OpenAiCompatible, ProviderType::Anthropic] {
            let parsed: ProviderType = pt.to_string().parse().unwrap();
            assert_eq!(parsed, pt);
        }
    }

    #[test]
    fn test_provider_config_defaults_to_gemini() {
        let config = ProviderConfig::default();
        assert_eq!(config.name, "gemini");
        assert_eq!(config.provider_type, ProviderType::OpenAiCompatible);
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::RateLimited {
            retry_after_ms: Some(500),
        };
        assert!(err.to_string().contains("500"));
        assert_eq!(LlmError::AuthenticationFailed.to_string(), "authentication failed");
    }
}
