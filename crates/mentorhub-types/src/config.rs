//! Global configuration types for Mentor Hub.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! LLM provider, the model-call timeout, and server defaults.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderConfig;

/// Top-level configuration for Mentor Hub.
///
/// Loaded from `~/.mentorhub/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Provider behind every flow and chat assistant.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Upper bound on one model call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Overrides the "today's date" line in prompt templates (free text,
    /// e.g. "October 15, 2025"). Defaults to the current date.
    #[serde(default)]
    pub prompt_date: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
            prompt_date: None,
            server: ServerConfig::default(),
        }
    }
}

/// Bind address and session limits for `mhub serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Chat sessions untouched for this long are dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
    /// Upper bound on live chat sessions.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderType;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.prompt_date.is_none());
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.session_idle_secs, 1800);
        assert_eq!(config.server.max_sessions, 1000);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
request_timeout_secs = 15
prompt_date = "October 15, 2025"

[provider]
name = "anthropic"
provider_type = "anthropic"
model = "claude-sonnet-4-5"
api_key_env = "ANTHROPIC_API_KEY"

[server]
port = 8080
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.prompt_date.as_deref(), Some("October 15, 2025"));
        assert_eq!(config.provider.provider_type, ProviderType::Anthropic);
        assert_eq!(config.provider.model, "claude-sonnet-4-5");
        assert_eq!(config.provider.max_tokens, 4096);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
