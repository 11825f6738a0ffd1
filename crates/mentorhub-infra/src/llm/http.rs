//! HTTP plumbing shared by the reqwest-backed providers.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use mentorhub_types::llm::LlmError;

/// Generous ceiling for long generations; the model-call boundary applies
/// the real per-call timeout.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(300);

pub fn build_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .build()
        .map_err(|e| LlmError::Provider {
            message: format!("failed to create HTTP client: {e}"),
        })
}

pub fn transport_error(err: reqwest::Error) -> LlmError {
    LlmError::Provider {
        message: format!("HTTP request failed: {err}"),
    }
}

/// Map a non-success HTTP status to the provider error taxonomy.
pub fn status_error(status: StatusCode, headers: &HeaderMap, body: String) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after_ms(headers),
        },
        503 | 529 => LlmError::Overloaded(body),
        400 | 422 => LlmError::InvalidRequest(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// `retry-after` in whole seconds, as milliseconds.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1000)
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, RETRY_AFTER};

    use super::*;

    #[test]
    fn test_status_mapping() {
        let headers = HeaderMap::new();
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, &headers, String::new()),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, &headers, "busy".into()),
            LlmError::Overloaded(body) if body == "busy"
        ));
        assert!(matches!(
            status_error(StatusCode::from_u16(529).unwrap(), &headers, String::new()),
            LlmError::Overloaded(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, &headers, "boom".into()),
            LlmError::Provider { message } if message.contains("boom")
        ));
    }

    #[test]
    fn test_rate_limit_reads_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, &headers, String::new()),
            LlmError::RateLimited {
                retry_after_ms: Some(7000)
            }
        ));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, &headers, String::new()),
            LlmError::RateLimited {
                retry_after_ms: None
            }
        ));
    }
}
