//! Slash command parsing for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Reset the conversation to the greeting.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Ask the assistant for a concept summary.
    Summarise,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/summarise" | "/summarize" | "/summary" => Some(ChatCommand::Summarise),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help(supports_summarise: bool) {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}       Show this help message", style("/help").cyan());
    println!("  {}      Start over from the greeting", style("/clear").cyan());
    if supports_summarise {
        println!("  {}  Summarise the concept", style("/summarise").cyan());
    }
    println!("  {}       End the chat session", style("/quit").cyan());
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse(" /Q "), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_summarise_spellings() {
        assert_eq!(parse("/summarise"), Some(ChatCommand::Summarise));
        assert_eq!(parse("/summarize please"), Some(ChatCommand::Summarise));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("hello world"), None);
        assert_eq!(parse("what does a/b mean"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo"), Some(ChatCommand::Unknown("/foo".to_string())));
    }
}
