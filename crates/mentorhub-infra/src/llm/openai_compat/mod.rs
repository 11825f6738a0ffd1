//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI, Google Gemini and any
//! custom Chat Completions endpoint via configurable base URLs and factory
//! functions.

pub mod config;
pub mod types;

use secrecy::{ExposeSecret, SecretString};

use mentorhub_core::llm::provider::LlmProvider;
use mentorhub_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};

use crate::llm::http::{build_client, status_error, transport_error};
use self::config::OpenAiCompatConfig;
use self::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Unified provider for any OpenAI-compatible API.
///
/// Does not derive Debug; the API key stays inside a [`SecretString`] and
/// only leaves it as the `Authorization` header.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    provider_name: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client()?,
            api_key: config.api_key,
            base_url: config.base_url,
            provider_name: config.provider_name,
            model: config.model,
            capabilities: config.capabilities,
        })
    }

    /// OpenAI at `https://api.openai.com/v1`.
    pub fn openai(api_key: SecretString, model: &str) -> Result<Self, LlmError> {
        Self::new(config::openai_defaults(api_key, model))
    }

    /// Google Gemini through its OpenAI-compatible beta endpoint.
    pub fn gemini(api_key: SecretString, model: &str) -> Result<Self, LlmError> {
        Self::new(config::gemini_defaults(api_key, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        ChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request
                .output_config
                .as_ref()
                .filter(|_| self.capabilities.structured_output)
                .map(|c| c.format.clone()),
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(provider = %self.provider_name, %status, "provider returned an error status");
            return Err(status_error(status, &headers, error_body));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Deserialization("response contained no choices".into()))?;

        if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
            return Err(LlmError::InvalidRequest(format!("model refused: {refusal}")));
        }

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("length") => StopReason::MaxTokens,
            Some("content_filter") => StopReason::ContentFilter,
            _ => StopReason::EndTurn,
        };

        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: parsed.id,
            content: choice.message.content.unwrap_or_default(),
            model: parsed.model,
            stop_reason,
            usage,
        })
    }
}
