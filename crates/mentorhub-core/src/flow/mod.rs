//! One-shot form flows.
//!
//! Each flow is a validated input, a prompt template, and a typed structured
//! output. [`runner::FlowRunner`] drives any [`Flow`] against a provider.

pub mod prompt;
pub mod runner;

use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use mentorhub_types::error::ValidationError;
use mentorhub_types::flow::{
    CodeSnippetInput, CodeSnippetOutput, ConceptExplainerInput, ConceptExplainerOutput,
    LearningPathInput, LearningPathOutput, ProjectIdeasInput, ProjectIdeasOutput,
};

use self::prompt::FlowPrompt;

/// A prompt-templated request with a structured reply.
pub trait Flow: Send + Sync {
    type Output: DeserializeOwned + Serialize + JsonSchema + Send;

    /// Stable flow name, used in routes, logs and the schema name.
    const NAME: &'static str;

    fn validate(&self) -> Result<(), ValidationError>;

    fn prompt(&self, date: &str) -> FlowPrompt;

    /// The output's primary content as markdown.
    fn markdown(output: &Self::Output) -> String;
}

/// Require at least `min` characters after trimming.
pub fn require_min_chars(
    field: &'static str,
    value: &str,
    min: usize,
    message: &str,
) -> Result<(), ValidationError> {
    if value.trim().chars().count() < min {
        return Err(ValidationError {
            field,
            message: message.to_string(),
        });
    }
    Ok(())
}

impl Flow for LearningPathInput {
    type Output = LearningPathOutput;
    const NAME: &'static str = "learning-path";

    fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars(
            "goals",
            &self.goals,
            10,
            "Please describe your goals in at least 10 characters.",
        )
    }

    fn prompt(&self, date: &str) -> FlowPrompt {
        FlowPrompt {
            system: prompt::system_prompt(date),
            user: prompt::learning_path(&self.skill_level.to_string(), &self.goals),
        }
    }

    fn markdown(output: &Self::Output) -> String {
        output.markdown()
    }
}

impl Flow for CodeSnippetInput {
    type Output = CodeSnippetOutput;
    const NAME: &'static str = "code-snippet";

    fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars(
            "task",
            &self.task,
            10,
            "Please describe the task in at least 10 characters.",
        )?;
        require_min_chars(
            "libraries",
            &self.libraries,
            2,
            "Please specify at least one library.",
        )
    }

    fn prompt(&self, date: &str) -> FlowPrompt {
        FlowPrompt {
            system: prompt::system_prompt(date),
            user: prompt::code_snippet(&self.task, &self.libraries),
        }
    }

    fn markdown(output: &Self::Output) -> String {
        output.markdown()
    }
}

impl Flow for ProjectIdeasInput {
    type Output = ProjectIdeasOutput;
    const NAME: &'static str = "project-ideas";

    fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars(
            "interests",
            &self.interests,
            3,
            "Please describe your interests in at least 3 characters.",
        )
    }

    fn prompt(&self, date: &str) -> FlowPrompt {
        FlowPrompt {
            system: prompt::system_prompt(date),
            user: prompt::project_ideas(&self.skill_level.to_string(), &self.interests),
        }
    }

    fn markdown(output: &Self::Output) -> String {
        output.markdown()
    }
}

impl Flow for ConceptExplainerInput {
    type Output = ConceptExplainerOutput;
    const NAME: &'static str = "concept-explainer";

    fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars(
            "concept",
            &self.concept,
            3,
            "Please enter a concept of at least 3 characters.",
        )?;
        require_min_chars(
            "user_background",
            &self.user_background,
            10,
            "Please describe your background in at least 10 characters.",
        )
    }

    fn prompt(&self, date: &str) -> FlowPrompt {
        FlowPrompt {
            system: prompt::system_prompt(date),
            user: prompt::concept_explainer(&self.concept, &self.user_background),
        }
    }

    fn markdown(output: &Self::Output) -> String {
        output.markdown()
    }
}
