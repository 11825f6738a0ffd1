use thiserror::Error;

use crate::llm::LlmError;

/// Rejections from the conversation controller's submit gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("message is empty")]
    EmptyInput,

    #[error("a reply is already pending")]
    Busy,
}

/// Failures of the model-call boundary. Every variant triggers rollback.
#[derive(Debug, Clone, Error)]
pub enum ModelCallError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model call timed out after {0}s")]
    Timeout(u64),

    #[error("model call was cancelled")]
    Cancelled,

    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

/// A form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

/// Failures of a one-shot form flow.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("flow timed out after {0}s")]
    Timeout(u64),

    #[error("malformed output: {0}")]
    MalformedOutput(String),
}

/// Errors reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError {
            field: "goals",
            message: "must be at least 10 characters".to_string(),
        };
        assert_eq!(err.to_string(), "goals: must be at least 10 characters");
    }

    #[test]
    fn test_model_call_error_from_llm() {
        let err: ModelCallError = LlmError::AuthenticationFailed.into();
        assert!(matches!(err, ModelCallError::Llm(LlmError::AuthenticationFailed)));
        assert_eq!(err.to_string(), "authentication failed");
    }

    #[test]
    fn test_flow_error_from_validation() {
        let err: FlowError = ValidationError {
            field: "task",
            message: "too short".to_string(),
        }
        .into();
        assert!(err.to_string().contains("task: too short"));
    }
}
