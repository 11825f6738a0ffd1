//! Global configuration loader for Mentor Hub.
//!
//! Reads `config.toml` from the data directory (`~/.mentorhub/` unless
//! `MENTORHUB_DATA_DIR` is set) and deserializes it into [`GlobalConfig`].
//! Falls back to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use mentorhub_types::config::GlobalConfig;
use mentorhub_types::error::ConfigError;
use mentorhub_types::llm::ProviderType;

use crate::secret::well_known_key_env;

pub const CONFIG_FILE: &str = "config.toml";

/// The Mentor Hub data directory.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("MENTORHUB_DATA_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mentorhub")
}

/// Read and parse `{data_dir}/config.toml`, surfacing every failure.
///
/// A missing file is not an error; it yields `Ok(None)`.
pub async fn read_global_config(data_dir: &Path) -> Result<Option<GlobalConfig>, ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let display = config_path.display().to_string();

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: display,
                source,
            });
        }
    };

    toml::from_str::<GlobalConfig>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: display,
            message: err.to_string(),
        })
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file cannot be read or parsed, logs a warning and returns the default.
/// - Environment overrides are applied last, see [`apply_env_overrides`].
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let mut config = match read_global_config(data_dir).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!(
                "No {CONFIG_FILE} found in {}, using defaults",
                data_dir.display()
            );
            GlobalConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            GlobalConfig::default()
        }
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Apply `MENTORHUB_PROVIDER` and `MENTORHUB_MODEL` on top of a loaded config.
///
/// Switching provider by name also switches the backend type and, when the
/// key variable was the previous provider's conventional one, the key
/// variable. `lookup` abstracts the environment for testing.
pub fn apply_env_overrides(config: &mut GlobalConfig, lookup: impl Fn(&str) -> Option<String>) {
    let nonempty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(name) = nonempty("MENTORHUB_PROVIDER") {
        let name = name.trim().to_lowercase();
        let previous_key_env = well_known_key_env(&config.provider);
        let follows_convention = previous_key_env == Some(config.provider.api_key_env.as_str());

        config.provider.provider_type = if name == "anthropic" {
            ProviderType::Anthropic
        } else {
            ProviderType::OpenAiCompatible
        };
        config.provider.name = name;

        if follows_convention {
            if let Some(key_env) = well_known_key_env(&config.provider) {
                config.provider.api_key_env = key_env.to_string();
            }
        }
        tracing::debug!(provider = %config.provider.name, "provider overridden from environment");
    }

    if let Some(model) = nonempty("MENTORHUB_MODEL") {
        config.provider.model = model.trim().to_string();
        tracing::debug!(model = %config.provider.model, "model overridden from environment");
    }
}
