//! FlowRunner: validate, prompt, call the provider, parse the structured output.

use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use mentorhub_types::config::GlobalConfig;
use mentorhub_types::error::FlowError;
use mentorhub_types::llm::{CompletionRequest, Message};

use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::structured_output::{output_config_for, parse_reply};

use super::Flow;
use super::prompt::prompt_date;

/// Runs form flows against one provider.
#[derive(Clone)]
pub struct FlowRunner {
    provider: Arc<BoxLlmProvider>,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
    prompt_date: Option<String>,
}

impl FlowRunner {
    pub fn new(provider: Arc<BoxLlmProvider>, config: &GlobalConfig) -> Self {
        Self {
            provider,
            model: config.provider.model.clone(),
            max_tokens: config.provider.max_tokens,
            temperature: config.provider.temperature,
            timeout: Duration::from_secs(config.request_timeout_secs),
            prompt_date: config.prompt_date.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the completion request for `flow` without sending it.
    pub fn request_for<F: Flow>(&self, flow: &F) -> CompletionRequest {
        let prompt = flow.prompt(&prompt_date(self.prompt_date.as_deref()));
        let schema_name = F::NAME.replace('-', "_");
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt.user)],
            system: Some(prompt.system),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            output_config: Some(output_config_for::<F::Output>(&schema_name)),
        }
    }

    pub async fn run<F: Flow>(&self, flow: &F) -> Result<F::Output, FlowError> {
        flow.validate()?;

        let request = self.request_for(flow);
        let span = tracing::info_span!(
            "gen_ai.flow",
            flow = F::NAME,
            gen_ai.operation.name = "chat",
            gen_ai.system = %self.provider.name(),
            gen_ai.request.model = %self.model,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        let response = tokio::time::timeout(self.timeout, self.provider.complete(&request))
            .instrument(span.clone())
            .await
            .map_err(|_| {
                tracing::warn!(flow = F::NAME, timeout_secs = self.timeout.as_secs(), "flow timed out");
                FlowError::Timeout(self.timeout.as_secs())
            })??;
        span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);

        parse_reply::<F::Output>(&response.content).map_err(|err| {
            tracing::warn!(flow = F::NAME, error = %err, "flow output did not match schema");
            FlowError::MalformedOutput(err.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_types::flow::{
        CodeSnippetInput, ConceptExplainerInput, LearningPathInput, LearningSkillLevel,
    };
    use mentorhub_types::llm::LlmError;

    use super::*;
    use crate::llm::box_provider::test_support::ScriptedProvider;

    fn runner(replies: Vec<Result<String, LlmError>>) -> (FlowRunner, Arc<std::sync::Mutex<Vec<CompletionRequest>>>) {
        let provider = ScriptedProvider::new(replies);
        let requests = provider.requests.clone();
        let config = GlobalConfig {
            prompt_date: Some("October 15, 2025".to_string()),
            ..GlobalConfig::default()
        };
        (FlowRunner::new(Arc::new(BoxLlmProvider::new(provider)), &config), requests)
    }

    #[tokio::test]
    async fn test_run_parses_structured_output() {
        let (runner, requests) = runner(vec![Ok(
            r#"{"code_snippet":"print(1)","explanation":"Prints."}"#.to_string(),
        )]);
        let output = runner
            .run(&CodeSnippetInput {
                task: "print a number please".to_string(),
                libraries: "stdlib".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output.code_snippet, "print(1)");

        let sent = requests.lock().unwrap();
        let request = &sent[0];
        assert!(request.system.as_deref().unwrap().contains("October 15, 2025"));
        let schema = &request.output_config.as_ref().unwrap().format.json_schema;
        assert_eq!(schema.name, "code_snippet");
        assert_eq!(schema.schema["additionalProperties"], false);
    }

    #[tokio::test]
    async fn test_validation_failure_never_calls_provider() {
        let (runner, requests) = runner(vec![]);
        let err = runner
            .run(&LearningPathInput {
                skill_level: LearningSkillLevel::Beginner,
                goals: "short".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_output() {
        let (runner, _) = runner(vec![Ok("I cannot help with that.".to_string())]);
        let err = runner
            .run(&ConceptExplainerInput {
                concept: "attention".to_string(),
                user_background: "I write Python daily".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn test_provider_error_is_llm_error() {
        let (runner, _) = runner(vec![Err(LlmError::RateLimited {
            retry_after_ms: None,
        })]);
        let err = runner
            .run(&ConceptExplainerInput {
                concept: "attention".to_string(),
                user_background: "I write Python daily".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Llm(LlmError::RateLimited { .. })));
    }
}
