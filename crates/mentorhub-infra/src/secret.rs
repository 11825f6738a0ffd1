//! API key resolution from the environment.
//!
//! Keys live only on the server side. The configured `api_key_env` is tried
//! first, then the well-known variable for the provider. Empty values count
//! as missing.

use secrecy::SecretString;

use mentorhub_types::llm::{ProviderConfig, ProviderType};

/// Read-only environment lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn get(&self, key: &str) -> Option<SecretString> {
        match std::env::var(key) {
            Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val.trim().to_string())),
            // Missing, empty, or not valid Unicode
            _ => None,
        }
    }
}

/// The conventional key variable for a provider, if it has one.
pub fn well_known_key_env(config: &ProviderConfig) -> Option<&'static str> {
    match (config.provider_type, config.name.as_str()) {
        (ProviderType::Anthropic, _) => Some("ANTHROPIC_API_KEY"),
        (ProviderType::OpenAiCompatible, "gemini") => Some("GEMINI_API_KEY"),
        (ProviderType::OpenAiCompatible, "openai") => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

/// Resolve the API key for `config` from the process environment.
pub fn resolve_api_key(config: &ProviderConfig) -> Option<SecretString> {
    let env = EnvSecretProvider::new();
    let resolved = env.get(&config.api_key_env).or_else(|| {
        well_known_key_env(config)
            .filter(|name| *name != config.api_key_env)
            .and_then(|name| env.get(name))
    });
    if resolved.is_none() {
        tracing::debug!(
            provider = %config.name,
            api_key_env = %config.api_key_env,
            "no API key found in environment"
        );
    }
    resolved
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_env_provider_get_existing_and_missing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("MENTORHUB_TEST_SECRET_1", "  test-value-123 ") };
        let env = EnvSecretProvider::new();
        assert_eq!(
            env.get("MENTORHUB_TEST_SECRET_1").unwrap().expose_secret(),
            "test-value-123"
        );
        assert!(env.get("NONEXISTENT_VAR_XYZ_123").is_none());
        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("MENTORHUB_TEST_SECRET_1") };
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("MENTORHUB_TEST_SECRET_EMPTY", "   ") };
        assert!(EnvSecretProvider::new().get("MENTORHUB_TEST_SECRET_EMPTY").is_none());
        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("MENTORHUB_TEST_SECRET_EMPTY") };
    }

    #[test]
    fn test_resolve_prefers_configured_variable() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("MENTORHUB_TEST_CUSTOM_KEY", "custom") };
        let config = ProviderConfig {
            name: "local".into(),
            api_key_env: "MENTORHUB_TEST_CUSTOM_KEY".into(),
            ..ProviderConfig::default()
        };
        assert_eq!(resolve_api_key(&config).unwrap().expose_secret(), "custom");
        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("MENTORHUB_TEST_CUSTOM_KEY") };
    }

    #[test]
    fn test_well_known_key_env() {
        let anthropic = ProviderConfig {
            name: "claude".into(),
            provider_type: ProviderType::Anthropic,
            ..ProviderConfig::default()
        };
        assert_eq!(well_known_key_env(&anthropic), Some("ANTHROPIC_API_KEY"));
        assert_eq!(well_known_key_env(&ProviderConfig::default()), Some("GEMINI_API_KEY"));

        let custom = ProviderConfig {
            name: "local".into(),
            ..ProviderConfig::default()
        };
        assert_eq!(well_known_key_env(&custom), None);
    }
}
