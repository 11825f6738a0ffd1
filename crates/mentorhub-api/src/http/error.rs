//! Application error type mapping to HTTP status codes and envelope format.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use mentorhub_types::error::{FlowError, SubmitError, ValidationError};
use mentorhub_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A form field or request body failed validation.
    Validation {
        field: Option<String>,
        message: String,
    },
    /// Unknown chat session.
    SessionNotFound(String),
    /// A reply is already pending for this session.
    Busy,
    /// The provider failed or returned something unusable. For chat
    /// submissions `transcript` carries the rolled-back transcript.
    Upstream {
        message: String,
        transcript: Option<serde_json::Value>,
    },
    /// The model call exceeded the configured timeout.
    Timeout {
        message: String,
        transcript: Option<serde_json::Value>,
    },
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            field: None,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation {
            field: Some(e.field.to_string()),
            message: e.message,
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::EmptyInput => AppError::Validation {
                field: Some("message".to_string()),
                message: "Message must not be empty.".to_string(),
            },
            SubmitError::Busy => AppError::Busy,
        }
    }
}

impl From<FlowError> for AppError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Validation(v) => v.into(),
            FlowError::Timeout(_) => AppError::Timeout {
                message: e.to_string(),
                transcript: None,
            },
            FlowError::Llm(LlmError::InvalidRequest(ref msg)) => AppError::Upstream {
                message: format!("provider rejected the request: {msg}"),
                transcript: None,
            },
            FlowError::Llm(_) | FlowError::MalformedOutput(_) => AppError::Upstream {
                message: e.to_string(),
                transcript: None,
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                message,
                field.map(|f| json!({ "field": f })),
            ),
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Chat session '{id}' not found"),
                None,
            ),
            AppError::Busy => (
                StatusCode::CONFLICT,
                "REPLY_PENDING",
                "A reply is already pending for this session".to_string(),
                None,
            ),
            AppError::Upstream {
                message,
                transcript,
            } => (
                StatusCode::BAD_GATEWAY,
                "MODEL_CALL_FAILED",
                message,
                transcript.map(|t| json!({ "transcript": t })),
            ),
            AppError::Timeout {
                message,
                transcript,
            } => (
                StatusCode::GATEWAY_TIMEOUT,
                "MODEL_CALL_TIMEOUT",
                message,
                transcript.map(|t| json!({ "transcript": t })),
            ),
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                message,
                None,
            ),
        };

        if status.is_server_error() {
            tracing::warn!(%status, code, %message, "request failed");
        }

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        let body = json!({
            "data": null,
            "meta": {
                "request_id": uuid::Uuid::now_v7().to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [error]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_error_mapping() {
        assert!(matches!(AppError::from(SubmitError::Busy), AppError::Busy));
        assert!(matches!(
            AppError::from(SubmitError::EmptyInput),
            AppError::Validation { field: Some(f), .. } if f == "message"
        ));
    }

    #[test]
    fn test_flow_error_mapping() {
        let err = AppError::from(FlowError::Validation(ValidationError {
            field: "goals",
            message: "too short".into(),
        }));
        assert!(matches!(err, AppError::Validation { field: Some(f), .. } if f == "goals"));
        assert!(matches!(AppError::from(FlowError::Timeout(60)), AppError::Timeout { .. }));
        assert!(matches!(
            AppError::from(FlowError::MalformedOutput("x".into())),
            AppError::Upstream { .. }
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Busy.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::SessionNotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Timeout {
                message: "slow".into(),
                transcript: None
            }
            .into_response()
            .status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
