//! CLI command definitions and dispatch for the `mhub` binary.
//!
//! Uses clap derive macros for argument parsing. Each form flow gets its
//! own subcommand; `chat` opens the interactive loop and `serve` starts the
//! REST API.

pub mod chat;
pub mod flow;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use mentorhub_core::chat::assistant::Assistant;
use mentorhub_types::flow::{LearningSkillLevel, ProjectSkillLevel};
use mentorhub_types::render::ContentFormat;

/// AI mentoring in your terminal: learning paths, code, ideas, and chat.
#[derive(Parser)]
#[command(name = "mhub", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to server.port in config.toml).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (defaults to server.host in config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat with an assistant interactively.
    Chat {
        #[arg(long, short, value_enum, default_value_t = AssistantArg::Guide)]
        assistant: AssistantArg,
    },

    /// Generate a personalized AI/ML learning path.
    #[command(name = "learning-path")]
    LearningPath {
        #[arg(long, value_enum)]
        level: LearningLevelArg,

        /// What you want to achieve (at least 10 characters).
        #[arg(long)]
        goals: String,
    },

    /// Generate a Python code snippet with an explanation.
    Code {
        /// The task the code should perform (at least 10 characters).
        #[arg(long)]
        task: String,

        /// Libraries to use (e.g. "pandas, scikit-learn").
        #[arg(long)]
        libraries: String,
    },

    /// Suggest AI/ML project ideas.
    Ideas {
        #[arg(long, value_enum)]
        level: ProjectLevelArg,

        /// Areas you are interested in (at least 3 characters).
        #[arg(long)]
        interests: String,
    },

    /// Explain an AI/ML concept for your background.
    Explain {
        #[arg(long)]
        concept: String,

        /// Your background (e.g. "high school student").
        #[arg(long)]
        background: String,
    },

    /// Render markdown or an HTML fragment to the terminal.
    Render {
        /// File to render, or `-` for stdin.
        #[arg(default_value = "-")]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = FormatArg::Markdown)]
        format: FormatArg,

        /// Print the escaped HTML serialization instead.
        #[arg(long)]
        html: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssistantArg {
    Guide,
    Tutor,
}

impl From<AssistantArg> for Assistant {
    fn from(arg: AssistantArg) -> Self {
        match arg {
            AssistantArg::Guide => Assistant::Guide,
            AssistantArg::Tutor => Assistant::Tutor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LearningLevelArg {
    Beginner,
    Intermediate,
    Pro,
}

impl From<LearningLevelArg> for LearningSkillLevel {
    fn from(arg: LearningLevelArg) -> Self {
        match arg {
            LearningLevelArg::Beginner => LearningSkillLevel::Beginner,
            LearningLevelArg::Intermediate => LearningSkillLevel::Intermediate,
            LearningLevelArg::Pro => LearningSkillLevel::Pro,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectLevelArg {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<ProjectLevelArg> for ProjectSkillLevel {
    fn from(arg: ProjectLevelArg) -> Self {
        match arg {
            ProjectLevelArg::Beginner => ProjectSkillLevel::Beginner,
            ProjectLevelArg::Intermediate => ProjectSkillLevel::Intermediate,
            ProjectLevelArg::Advanced => ProjectSkillLevel::Advanced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Markdown,
    HtmlFragment,
}

impl From<FormatArg> for ContentFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => ContentFormat::Markdown,
            FormatArg::HtmlFragment => ContentFormat::HtmlFragment,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_learning_path() {
        let cli = Cli::try_parse_from([
            "mhub",
            "learning-path",
            "--level",
            "pro",
            "--goals",
            "ship an ML platform",
        ])
        .unwrap();
        match cli.command {
            Commands::LearningPath { level, goals } => {
                assert_eq!(LearningSkillLevel::from(level), LearningSkillLevel::Pro);
                assert_eq!(goals, "ship an ML platform");
            }
            _ => panic!("expected learning-path"),
        }
    }

    #[test]
    fn test_learning_path_rejects_advanced() {
        assert!(
            Cli::try_parse_from(["mhub", "learning-path", "--level", "advanced", "--goals", "x"])
                .is_err()
        );
    }

    #[test]
    fn test_chat_defaults_to_guide() {
        let cli = Cli::try_parse_from(["mhub", "-v", "chat"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Commands::Chat {
                assistant: AssistantArg::Guide
            }
        ));
    }

    #[test]
    fn test_render_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["mhub", "render", "--format", "html-fragment"]).unwrap();
        match cli.command {
            Commands::Render { file, format, html } => {
                assert_eq!(file, PathBuf::from("-"));
                assert_eq!(ContentFormat::from(format), ContentFormat::HtmlFragment);
                assert!(!html);
            }
            _ => panic!("expected render"),
        }
    }
}
