//! AnthropicProvider: concrete [`LlmProvider`] implementation for Anthropic Claude.
//!
//! Sends requests to the Anthropic Messages API (`/v1/messages`) with the
//! `x-api-key` and `anthropic-version` headers. The API key is wrapped in
//! [`secrecy::SecretString`] and is never logged or included in `Debug`
//! output.

use secrecy::{ExposeSecret, SecretString};

use mentorhub_core::llm::provider::LlmProvider;
use mentorhub_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, ProviderCapabilities,
    StopReason, Usage,
};

use crate::llm::http::{build_client, status_error, transport_error};
use super::types::{AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic Claude LLM provider.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl AnthropicProvider {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: SecretString, model: String) -> Result<Self, LlmError> {
        let capabilities = Self::capabilities_for_model(&model);
        Ok(Self {
            client: build_client()?,
            api_key,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            model,
            capabilities,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn capabilities_for_model(model: &str) -> ProviderCapabilities {
        let max_output_tokens = if model.contains("opus") { 32_000 } else { 8_192 };
        ProviderCapabilities {
            structured_output: true,
            max_context_tokens: 200_000,
            max_output_tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn to_anthropic_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        // System turns travel in the top-level `system` field, not in messages.
        let mut system = request.system.clone();
        let mut messages = Vec::with_capacity(request.messages.len());
        for m in &request.messages {
            match m.role {
                MessageRole::System => {
                    let joined = match system.take() {
                        Some(existing) => format!("{existing}\n\n{}", m.content),
                        None => m.content.clone(),
                    };
                    system = Some(joined);
                }
                _ => messages.push(AnthropicMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                }),
            }
        }

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        AnthropicRequest {
            model,
            max_tokens: request.max_tokens,
            messages,
            system,
            temperature: request.temperature,
            output_config: request.output_config.as_ref().map(Into::into),
        }
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_anthropic_request(request);

        let response = self
            .client
            .post(self.url("/v1/messages"))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(provider = "anthropic", %status, "provider returned an error status");
            return Err(status_error(status, &headers, error_body));
        }

        let anthropic_resp: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = anthropic_resp
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
                AnthropicContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let stop_reason = match anthropic_resp.stop_reason.as_deref() {
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            Some("refusal") => StopReason::ContentFilter,
            _ => StopReason::EndTurn,
        };

        Ok(CompletionResponse {
            id: anthropic_resp.id,
            content,
            model: anthropic_resp.model,
            stop_reason,
            usage: Usage {
                input_tokens: anthropic_resp.usage.input_tokens,
                output_tokens: anthropic_resp.usage.output_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_types::llm::{Message, OutputConfig};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn make_provider() -> AnthropicProvider {
        AnthropicProvider::new(
            SecretString::from("test-key-not-real"),
            "claude-sonnet-4-20250514".to_string(),
        )
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![Message::user("Hello")],
            system: Some("Be helpful".to_string()),
            max_tokens: 1024,
            temperature: Some(0.7),
            output_config: Some(OutputConfig::json_schema("ModelReply", json!({"type": "object"}))),
        }
    }

    #[test]
    fn test_provider_name_and_capabilities() {
        let provider = make_provider();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.capabilities().max_output_tokens, 8_192);

        let opus = AnthropicProvider::new(SecretString::from("k"), "claude-opus-4-20250514".into()).unwrap();
        assert_eq!(opus.capabilities().max_output_tokens, 32_000);
    }

    #[test]
    fn test_to_anthropic_request() {
        let provider = make_provider();
        let mut req = request();
        req.messages.insert(
            0,
            Message {
                role: MessageRole::System,
                content: "Extra rule".into(),
            },
        );

        let anthropic_req = provider.to_anthropic_request(&req);
        assert_eq!(anthropic_req.model, "claude-sonnet-4-20250514");
        assert_eq!(anthropic_req.messages.len(), 1);
        assert_eq!(anthropic_req.messages[0].role, "user");
        assert_eq!(anthropic_req.system.as_deref(), Some("Be helpful\n\nExtra rule"));
        assert!(anthropic_req.output_config.is_some());
    }

    #[test]
    fn test_base_url_override() {
        let provider = make_provider().with_base_url("http://localhost:8080/".to_string());
        assert_eq!(provider.url("/v1/messages"), "http://localhost:8080/v1/messages");
    }

    #[tokio::test]
    async fn test_complete_against_mock() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key-not-real"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "system": "Be helpful",
                "output_config": {"format": {"type": "json_schema"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_01",
                "model": "claude-sonnet-4-20250514",
                "content": [{"type": "text", "text": "{\"response\":\"Hi\"}"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 10, "output_tokens": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = make_provider().with_base_url(server.uri());
        let response = provider.complete(&request()).await.unwrap();
        assert_eq!(response.id, "msg_01");
        assert_eq!(response.content, "{\"response\":\"Hi\"}");
        assert_eq!(response.usage.output_tokens, 4);
    }

    #[tokio::test]
    async fn test_complete_maps_overloaded_529() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded_error"))
            .mount(&server)
            .await;

        let provider = make_provider().with_base_url(server.uri());
        let err = provider.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Overloaded(_)));
    }

    #[tokio::test]
    async fn test_complete_maps_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
            .mount(&server)
            .await;

        let provider = make_provider().with_base_url(server.uri());
        let err = provider.complete(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_ms: Some(2000)
            }
        ));
    }
}
