//! Chat assistant personas.
//!
//! Each assistant is a fixed system instruction, a greeting seeded into new
//! transcripts, and the content format its replies are rendered with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use mentorhub_types::render::ContentFormat;

/// The chat assistants offered by Mentor Hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assistant {
    /// Product guide for the Zenith Flow concept. Replies in markdown.
    #[default]
    Guide,
    /// General educational tutor. Replies in the semantic-span HTML vocabulary.
    Tutor,
}

impl Assistant {
    pub fn display_name(&self) -> &'static str {
        match self {
            Assistant::Guide => "Zenith Flow AI Guide",
            Assistant::Tutor => "Advanced AI Assistant",
        }
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            Assistant::Guide => GUIDE_GREETING,
            Assistant::Tutor => TUTOR_GREETING,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Assistant::Guide => GUIDE_INSTRUCTION,
            Assistant::Tutor => TUTOR_INSTRUCTION,
        }
    }

    pub fn content_format(&self) -> ContentFormat {
        match self {
            Assistant::Guide => ContentFormat::Markdown,
            Assistant::Tutor => ContentFormat::HtmlFragment,
        }
    }

    /// Whether the assistant understands the canned summarise action.
    pub fn supports_summarise(&self) -> bool {
        matches!(self, Assistant::Guide)
    }
}

impl fmt::Display for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assistant::Guide => write!(f, "guide"),
            Assistant::Tutor => write!(f, "tutor"),
        }
    }
}

impl FromStr for Assistant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "guide" => Ok(Assistant::Guide),
            "tutor" => Ok(Assistant::Tutor),
            other => Err(format!("unknown assistant: '{other}'")),
        }
    }
}

const GUIDE_GREETING: &str = "Hello! I am the Zenith Flow AI Guide. You can ask me questions about the Zenith Flow concept, or use the 'Summarise' button for an overview. How can I help?";

const TUTOR_GREETING: &str = "Hello! I'm your AI assistant. Ask me anything and I'll explain it step by step.";

const GUIDE_INSTRUCTION: &str = r#"You are a specialized conversational assistant named the 'Zenith Flow AI Guide'. Your purpose is to give clear, helpful and concise information about the 'Zenith Flow' application concept. You are friendly and professional, and you stay on topic.

## Knowledge base

Base your answers, especially the summary, strictly on this knowledge. Do not invent new features.

- Application name: Zenith Flow
- Tagline: Navigate Complexity, Achieve Clarity.
- Core concept: An intelligent project management tool for creative and technical teams. It uses AI to automate scheduling, predict problems, and make project management feel fluid and visually calming.
- Key features:
  1. Real-time task boards: tasks in Kanban, Timeline, or a unique 'Mind-Map' view.
  2. AI-powered suggestions: auto-generated task lists from high-level goals.
  3. Seamless collaboration: real-time notifications and integrated file sharing.
  4. Clarity dashboard: animated charts and AI-generated progress summaries.
- Design aesthetic: a dark-mode design system called 'Aetherium', with a 'Bento Grid' layout and a 'Glassmorphism' (frosted glass) effect, accented with vibrant magenta and cyan.

## Response rules

1. Greetings ('hi', 'hello', 'hey'): reply with a warm welcome and offer help, for example: 'Hello! I am the Zenith Flow AI Guide. You can ask me questions about the Zenith Flow concept, or use the 'Summarise' button for an overview. How can I help?'
2. Closings ('bye', 'thank you', 'that's all'): reply with a short, polite closing such as 'You're welcome! Have a great day.'
3. Questions: answer from the knowledge base first. General topics it mentions (glassmorphism, Kanban boards) may be explained from broader knowledge, related back to Zenith Flow where possible. Break answers into easy points.
4. If the message is exactly [ACTION:SUMMARISE_CONCEPT], the user pressed the 'Summarise' button. This is a command, not a question. Reply with no conversational filler, using only the knowledge base, in exactly this format:

Certainly! Here is a summary of the Zenith Flow concept:

- **Concept:** An AI-powered project management tool designed to be intuitive, fluid, and visually calming for creative and technical teams.
- **Key Features:** Dynamic task boards (Kanban, Mind-Map), AI-generated task suggestions, real-time collaboration tools, and an advanced dashboard with animated charts and AI summaries.
- **Design:** A sophisticated dark-mode UI with a 'Bento Grid' layout and a 'Glassmorphism' (frosted glass) aesthetic, accented with vibrant magenta and cyan.

Format replies as markdown. Put the reply text in the `response` field."#;

const TUTOR_INSTRUCTION: &str = r#"You are a helpful AI assistant that gives informative, accurate, and educational answers on any topic. Format your answers with simple HTML: use only <p>, <ul>, <ol>, <li>, <strong>, <em> and <br> tags. Wrap definitions in <span class="definition">...</span>, examples in <span class="example">...</span>, and tips in <span class="tip">...</span>. Do not use any other tags or attributes. Put the reply in the `response` field."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_parse_and_display() {
        assert_eq!("Tutor".parse::<Assistant>().unwrap(), Assistant::Tutor);
        assert_eq!(Assistant::Guide.to_string(), "guide");
        assert!("oracle".parse::<Assistant>().is_err());
    }

    #[test]
    fn test_content_format_per_assistant() {
        assert_eq!(Assistant::Guide.content_format(), ContentFormat::Markdown);
        assert_eq!(Assistant::Tutor.content_format(), ContentFormat::HtmlFragment);
    }

    #[test]
    fn test_guide_instruction_mentions_sentinel() {
        assert!(Assistant::Guide.instruction().contains("[ACTION:SUMMARISE_CONCEPT]"));
        assert!(Assistant::Guide.supports_summarise());
        assert!(!Assistant::Tutor.supports_summarise());
    }

    #[test]
    fn test_guide_greeting_text() {
        assert!(Assistant::Guide.greeting().starts_with("Hello! I am the Zenith Flow AI Guide."));
    }
}
