//! Configuration types and per-provider defaults for OpenAI-compatible providers.

use secrecy::SecretString;

use mentorhub_types::llm::ProviderCapabilities;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Configuration for an OpenAI-compatible LLM provider.
pub struct OpenAiCompatConfig {
    /// Provider name reported in logs and spans (e.g., "openai", "gemini").
    pub provider_name: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

/// OpenAI default configuration: 128K context, 16K output.
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            structured_output: true,
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
    }
}

/// Google Gemini default configuration (OpenAI-compatible beta endpoint).
///
/// Capabilities: 1M context, 64K output.
pub fn gemini_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "gemini".into(),
        base_url: GEMINI_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            structured_output: true,
            max_context_tokens: 1_000_000,
            max_output_tokens: 65_536,
        },
    }
}

/// A custom endpoint. Structured output support is assumed; servers that
/// ignore `response_format` still work because replies are parsed leniently.
pub fn custom(
    provider_name: &str,
    base_url: &str,
    api_key: SecretString,
    model: &str,
) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: provider_name.into(),
        base_url: base_url.trim_end_matches('/').into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            structured_output: true,
            max_context_tokens: 128_000,
            max_output_tokens: 8_192,
        },
    }
}
