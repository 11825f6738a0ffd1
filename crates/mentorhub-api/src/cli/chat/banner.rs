//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(name: &str, provider: &str, model: &str, supports_summarise: bool) {
    println!();
    println!("  {}", style(name).cyan().bold());
    println!();
    println!("  {}  {}", style("Provider:").bold(), style(provider).dim());
    println!("  {}     {}", style("Model:").bold(), style(model).dim());
    println!();
    if supports_summarise {
        println!(
            "  {}",
            style("Type /summarise for an overview, /help for commands, Ctrl+D to exit").dim()
        );
    } else {
        println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    }
    println!("  {}", style("---").dim());
    println!();
}
