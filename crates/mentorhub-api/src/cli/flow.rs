//! One-shot flow commands: `learning-path`, `code`, `ideas`, `explain`.

use console::style;
use serde_json::json;

use mentorhub_core::flow::Flow;
use mentorhub_core::render::{render, to_plain_text};

use crate::cli::chat::loop_runner::thinking_spinner;
use crate::cli::chat::renderer::ChatRenderer;
use crate::state::AppState;

/// Run `input` through its flow and print the result.
///
/// With `--json` the structured output is printed alongside its markdown
/// and plain-text projection.
pub async fn run_flow<F: Flow>(
    state: &AppState,
    input: F,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let spinner = (!json && !quiet).then(|| thinking_spinner("generating..."));
    let result = state.flows.run(&input).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let output = result?;

    let markdown = F::markdown(&output);
    let rendered = render(&markdown);

    if json {
        let value = json!({
            "flow": F::NAME,
            "output": output,
            "markdown": markdown,
            "plain": to_plain_text(&rendered),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("{}", ChatRenderer::new().render(&rendered));
    println!();
    if !quiet {
        println!(
            "  {} {} {} {}",
            style("|").dim(),
            style(F::NAME).dim(),
            style("\u{00b7}").dim(),
            style(state.flows.model()).dim()
        );
        println!();
    }
    Ok(())
}
