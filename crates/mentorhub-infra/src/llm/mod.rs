//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`](mentorhub_core::llm::provider::LlmProvider)
//! trait, plus [`create_provider`] which builds the right one from a
//! [`ProviderConfig`] and [`test_provider_connection`] for a startup probe.

pub mod anthropic;
pub mod http;
pub mod openai_compat;

use secrecy::SecretString;

use mentorhub_core::llm::box_provider::BoxLlmProvider;
use mentorhub_types::llm::{CompletionRequest, LlmError, Message, ProviderConfig, ProviderType};

use self::anthropic::AnthropicProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`].
///
/// The API key is resolved by the caller (see [`crate::secret`]); a missing
/// key fails with [`LlmError::AuthenticationFailed`] before any request.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<&SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.cloned().ok_or(LlmError::AuthenticationFailed)?;

    match config.provider_type {
        ProviderType::Anthropic => {
            let mut provider = AnthropicProvider::new(key, config.model.clone())?;
            if let Some(base_url) = config.base_url.as_deref() {
                provider = provider.with_base_url(base_url.to_string());
            }
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::OpenAiCompatible => {
            let provider = match config.base_url.as_deref() {
                Some(base_url) => OpenAiCompatibleProvider::new(openai_compat::config::custom(
                    &config.name,
                    base_url,
                    key,
                    &config.model,
                ))?,
                None => match config.name.as_str() {
                    "openai" => OpenAiCompatibleProvider::openai(key, &config.model)?,
                    "gemini" => OpenAiCompatibleProvider::gemini(key, &config.model)?,
                    other => {
                        return Err(LlmError::InvalidRequest(format!(
                            "provider '{other}' needs a base_url"
                        )));
                    }
                },
            };
            Ok(BoxLlmProvider::new(provider))
        }
    }
}

/// Send a minimal completion to verify the key and endpoint.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: String::new(),
        messages: vec![Message::user("Hello")],
        system: None,
        max_tokens: 10,
        temperature: Some(0.0),
        output_config: None,
    };
    provider.complete(&request).await?;
    Ok(())
}
