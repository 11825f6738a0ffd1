//! Structured output helpers.
//!
//! Replies are requested as JSON matching a `schemars`-derived schema and
//! parsed back into the Rust type.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use mentorhub_types::llm::{OutputConfig, add_additional_properties_false};

/// Strict JSON schema for `T`, with `additionalProperties: false` on every object.
pub fn schema_for<T: JsonSchema>() -> serde_json::Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
    add_additional_properties_false(&mut schema);
    if let serde_json::Value::Object(map) = &mut schema {
        map.remove("$schema");
    }
    schema
}

/// Output config asking the provider to reply with a `T`.
pub fn output_config_for<T: JsonSchema>(name: &str) -> OutputConfig {
    OutputConfig::json_schema(name, schema_for::<T>())
}

/// Parse a model reply into `T`.
///
/// Accepts a bare JSON object, or one wrapped in a ```json fence, which
/// some OpenAI-compatible endpoints emit even in JSON mode.
pub fn parse_reply<T: DeserializeOwned>(content: &str) -> Result<T, serde_json::Error> {
    let trimmed = content.trim();
    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(err) => match strip_json_fence(trimmed) {
            Some(inner) => serde_json::from_str(inner),
            None => Err(err),
        },
    }
}

fn strip_json_fence(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("```")?;
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```")?;
    Some(rest.trim())
}
