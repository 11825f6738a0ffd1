//! Main chat loop orchestration.
//!
//! Opens an in-memory conversation for the chosen assistant, prints the
//! banner and greeting, then reads lines until EOF. Each line goes through
//! the same single-flight controller the HTTP API uses.

use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use mentorhub_core::chat::assistant::Assistant;
use mentorhub_core::chat::session::SharedConversation;
use mentorhub_core::render::render_as;
use mentorhub_types::chat::{CannedAction, ExchangeOutcome, Message, Role};
use mentorhub_types::error::SubmitError;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Spinner shown while a model call is in flight.
pub fn thinking_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_message(renderer: &ChatRenderer, assistant: Assistant, message: &Message) {
    let rendered = render_as(assistant.content_format(), &message.content);
    println!();
    println!("  {}", style(assistant.display_name()).cyan().bold());
    println!("{}", renderer.render(&rendered));
    println!();
}

fn print_latest_reply(renderer: &ChatRenderer, conversation: &SharedConversation) {
    let snapshot = conversation.snapshot();
    if let Some(message) = snapshot
        .transcript
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
    {
        print_message(renderer, snapshot.assistant, message);
    }
}

fn print_notifications(conversation: &SharedConversation) {
    for notification in conversation.drain_notifications() {
        eprintln!(
            "\n  {} {}",
            style("!").red().bold(),
            style(&notification.title).red().bold()
        );
        eprintln!("  {}", style(&notification.description).dim());
    }
}

/// Run the interactive chat loop for an assistant.
pub async fn run_chat_loop(state: &AppState, assistant: Assistant) -> anyhow::Result<()> {
    let conversation = state.new_conversation(assistant);
    let renderer = ChatRenderer::new();

    print_welcome_banner(
        assistant.display_name(),
        state.provider.name(),
        state.flows.model(),
        assistant.supports_summarise(),
    );
    if let Some(greeting) = conversation.snapshot().transcript.first() {
        print_message(&renderer, assistant, greeting);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        let action = match commands::parse(&text) {
            None => None,
            Some(ChatCommand::Help) => {
                commands::print_help(assistant.supports_summarise());
                continue;
            }
            Some(ChatCommand::Clear) => {
                if conversation.clear().is_ok() {
                    chat_input.clear();
                    print_latest_reply(&renderer, &conversation);
                }
                continue;
            }
            Some(ChatCommand::Exit) => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            Some(ChatCommand::Summarise) if assistant.supports_summarise() => {
                Some(CannedAction::SummariseConcept)
            }
            Some(ChatCommand::Summarise) => {
                println!(
                    "\n  {} {} has no summarise action.\n",
                    style("?").yellow().bold(),
                    assistant.display_name()
                );
                continue;
            }
            Some(ChatCommand::Unknown(name)) => {
                println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                );
                continue;
            }
        };

        let spinner = thinking_spinner("thinking...");
        let start = Instant::now();
        let result = match action {
            Some(action) => {
                conversation
                    .submit_canned_action(action, state.boundary.as_ref())
                    .await
            }
            None => conversation.submit(&text, state.boundary.as_ref()).await,
        };
        spinner.finish_and_clear();
        // The transcript is re-rendered from snapshots; view events only
        // matter to the web client.
        conversation.drain_view_events();

        match result {
            Ok(ExchangeOutcome::Replied { .. }) => {
                print_latest_reply(&renderer, &conversation);
                println!(
                    "  {} {:.1}s {} {}",
                    style("|").dim(),
                    style(start.elapsed().as_secs_f64()).dim(),
                    style("\u{00b7}").dim(),
                    style(state.flows.model()).dim()
                );
                println!();
            }
            Ok(ExchangeOutcome::RolledBack { reason, .. }) => {
                print_notifications(&conversation);
                tracing::debug!(%reason, "exchange rolled back");
                eprintln!(
                    "  {}",
                    style("Your message was not sent. Type it again to retry.").dim()
                );
            }
            Ok(ExchangeOutcome::Stale) => {}
            Err(SubmitError::EmptyInput) => {}
            Err(SubmitError::Busy) => {
                eprintln!("\n  {} Still waiting for the last reply.", style("!").yellow().bold());
            }
        }
    }

    chat_input.flush();
    Ok(())
}
