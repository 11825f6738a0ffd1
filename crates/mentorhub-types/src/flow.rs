//! Form flow inputs and structured outputs.
//!
//! Outputs derive `JsonSchema`; the schema is sent to the provider as the
//! structured-output constraint, and doc comments become field descriptions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Skill levels offered by the learning-path form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LearningSkillLevel {
    Beginner,
    Intermediate,
    Pro,
}

impl fmt::Display for LearningSkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearningSkillLevel::Beginner => write!(f, "Beginner"),
            LearningSkillLevel::Intermediate => write!(f, "Intermediate"),
            LearningSkillLevel::Pro => write!(f, "Pro"),
        }
    }
}

/// Skill levels offered by the project-ideas form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ProjectSkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for ProjectSkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectSkillLevel::Beginner => write!(f, "Beginner"),
            ProjectSkillLevel::Intermediate => write!(f, "Intermediate"),
            ProjectSkillLevel::Advanced => write!(f, "Advanced"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPathInput {
    pub skill_level: LearningSkillLevel,
    pub goals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LearningPathOutput {
    /// A personalized learning path in AI, ML, and Data Science.
    pub learning_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSnippetInput {
    pub task: String,
    pub libraries: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeSnippetOutput {
    /// The generated code snippet.
    pub code_snippet: String,
    /// The explanation of the code snippet.
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectIdeasInput {
    pub skill_level: ProjectSkillLevel,
    pub interests: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectIdeasOutput {
    /// A list of AI/ML project ideas tailored to the user.
    pub project_ideas: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptExplainerInput {
    pub concept: String,
    pub user_background: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConceptExplainerOutput {
    /// A detailed explanation of the concept, tailored to the user background.
    pub explanation: String,
}

impl LearningPathOutput {
    pub fn markdown(&self) -> String {
        self.learning_path.clone()
    }
}

impl CodeSnippetOutput {
    /// The snippet as a fenced python block followed by the explanation.
    ///
    /// Models sometimes return the snippet already fenced; it is kept as-is then.
    pub fn markdown(&self) -> String {
        let snippet = self.code_snippet.trim_end();
        let fenced = if snippet.trim_start().starts_with("```") {
            snippet.to_string()
        } else {
            format!("```python\n{snippet}\n```")
        };
        format!("{fenced}\n\n{}", self.explanation)
    }
}

impl ProjectIdeasOutput {
    pub fn markdown(&self) -> String {
        self.project_ideas.clone()
    }
}

impl ConceptExplainerOutput {
    pub fn markdown(&self) -> String {
        self.explanation.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_level_serializes_capitalized() {
        assert_eq!(
            serde_json::to_string(&LearningSkillLevel::Pro).unwrap(),
            "\"Pro\""
        );
        let parsed: ProjectSkillLevel = serde_json::from_str("\"Advanced\"").unwrap();
        assert_eq!(parsed, ProjectSkillLevel::Advanced);
        assert!(serde_json::from_str::<LearningSkillLevel>("\"Advanced\"").is_err());
    }

    #[test]
    fn test_code_snippet_markdown_adds_fence() {
        let output = CodeSnippetOutput {
            code_snippet: "print(1)\n".to_string(),
            explanation: "Prints one.".to_string(),
        };
        assert_eq!(output.markdown(), "```python\nprint(1)\n```\n\nPrints one.");
    }

    #[test]
    fn test_code_snippet_markdown_keeps_existing_fence() {
        let output = CodeSnippetOutput {
            code_snippet: "```py\nx = 2\n```".to_string(),
            explanation: "Assigns.".to_string(),
        };
        assert_eq!(output.markdown(), "```py\nx = 2\n```\n\nAssigns.");
    }

    #[test]
    fn test_output_schema_has_descriptions() {
        let schema = serde_json::to_value(schemars::schema_for!(ConceptExplainerOutput)).unwrap();
        let description = schema["properties"]["explanation"]["description"]
            .as_str()
            .unwrap();
        assert!(description.contains("tailored to the user background"));
    }
}
