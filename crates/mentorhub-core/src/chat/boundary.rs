//! The model-call boundary.
//!
//! The conversation controller's only I/O dependency. Production code uses
//! [`AssistantBoundary`], which talks to a `BoxLlmProvider`; tests plug in
//! closures through [`FnModelCall`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use mentorhub_types::chat::{ModelReply, ModelRequest};
use mentorhub_types::error::ModelCallError;
use mentorhub_types::llm::{CompletionRequest, Message, OutputConfig, ProviderConfig};

use crate::chat::assistant::Assistant;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::structured_output::{parse_reply, schema_for};

/// A request/response call to a text-completion service.
pub trait ModelCall: Send + Sync {
    fn call(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, ModelCallError>> + Send;
}

impl<T: ModelCall> ModelCall for Arc<T> {
    fn call(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, ModelCallError>> + Send {
        (**self).call(request)
    }
}

/// Build the boundary request for a persona and a piece of user text.
pub fn model_request(instruction: &str, text: impl Into<String>) -> ModelRequest {
    ModelRequest {
        text: text.into(),
        instruction: instruction.to_string(),
        reply_schema: schema_for::<ModelReply>(),
    }
}

/// Closure-backed boundary.
///
/// The closure receives an owned copy of the request so the returned
/// future does not borrow from the caller.
pub struct FnModelCall<F>(pub F);

impl<F, Fut> ModelCall for FnModelCall<F>
where
    F: Fn(ModelRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ModelReply, ModelCallError>> + Send,
{
    fn call(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, ModelCallError>> + Send {
        (self.0)(request.clone())
    }
}

/// Wraps a boundary so calls that outlive `timeout` fail with
/// [`ModelCallError::Timeout`].
pub struct WithTimeout<B> {
    inner: B,
    timeout: Duration,
}

impl<B> WithTimeout<B> {
    pub fn new(inner: B, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<B: ModelCall> ModelCall for WithTimeout<B> {
    async fn call(&self, request: &ModelRequest) -> Result<ModelReply, ModelCallError> {
        match tokio::time::timeout(self.timeout, self.inner.call(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "model call timed out");
                Err(ModelCallError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}

/// Boundary backed by an LLM provider.
///
/// Every call is stateless: the persona instruction goes in the system
/// prompt and the user text is the only message.
pub struct AssistantBoundary {
    provider: Arc<BoxLlmProvider>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl AssistantBoundary {
    pub fn new(provider: Arc<BoxLlmProvider>, config: &ProviderConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Build the boundary request this assistant would send for `text`.
    pub fn request_for(assistant: Assistant, text: impl Into<String>) -> ModelRequest {
        model_request(assistant.instruction(), text)
    }

    fn completion_request(&self, request: &ModelRequest) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::user(request.text.clone())],
            system: Some(request.instruction.clone()),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            output_config: Some(OutputConfig::json_schema(
                "ModelReply",
                request.reply_schema.clone(),
            )),
        }
    }
}

impl ModelCall for AssistantBoundary {
    async fn call(&self, request: &ModelRequest) -> Result<ModelReply, ModelCallError> {
        let completion = self.completion_request(request);
        let span = tracing::info_span!(
            "gen_ai.chat",
            gen_ai.operation.name = "chat",
            gen_ai.system = %self.provider.name(),
            gen_ai.request.model = %self.model,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        let response = self
            .provider
            .complete(&completion)
            .instrument(span.clone())
            .await?;
        span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);

        interpret_reply(&response.content)
    }
}

/// Structured JSON reply when possible; otherwise the raw text is the reply.
fn interpret_reply(content: &str) -> Result<ModelReply, ModelCallError> {
    match parse_reply::<ModelReply>(content) {
        Ok(reply) => Ok(reply),
        Err(err) if content.trim().is_empty() => Err(ModelCallError::MalformedReply(format!(
            "empty reply ({err})"
        ))),
        Err(_) => {
            tracing::debug!("reply was not structured JSON, using raw text");
            Ok(ModelReply {
                response: content.to_string(),
            })
        }
    }
}
