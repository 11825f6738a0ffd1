//! Mentor Hub CLI and REST API entry point.
//!
//! Binary name: `mhub`
//!
//! Parses CLI arguments, loads configuration, builds the LLM provider, then
//! dispatches to the matching command or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use mentorhub_types::flow::{
    CodeSnippetInput, ConceptExplainerInput, LearningPathInput, ProjectIdeasInput,
};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,mentorhub_api=debug,mentorhub_core=debug,mentorhub_infra=debug",
        _ => "trace",
    };
    mentorhub_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    mentorhub_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that never call a model don't need app state
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "mhub", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Render { file, format, html } => {
            return cli::render::render_file(file, (*format).into(), *html, cli.json).await;
        }
        _ => {}
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            serve(state, &host, port).await?;
        }

        Commands::Chat { assistant } => {
            cli::chat::loop_runner::run_chat_loop(&state, assistant.into()).await?;
        }

        Commands::LearningPath { level, goals } => {
            let input = LearningPathInput {
                skill_level: level.into(),
                goals,
            };
            cli::flow::run_flow(&state, input, cli.json, cli.quiet).await?;
        }

        Commands::Code { task, libraries } => {
            let input = CodeSnippetInput { task, libraries };
            cli::flow::run_flow(&state, input, cli.json, cli.quiet).await?;
        }

        Commands::Ideas { level, interests } => {
            let input = ProjectIdeasInput {
                skill_level: level.into(),
                interests,
            };
            cli::flow::run_flow(&state, input, cli.json, cli.quiet).await?;
        }

        Commands::Explain {
            concept,
            background,
        } => {
            let input = ConceptExplainerInput {
                concept,
                user_background: background,
            };
            cli::flow::run_flow(&state, input, cli.json, cli.quiet).await?;
        }

        Commands::Completions { .. } | Commands::Render { .. } => {}
    }

    Ok(())
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!(data_dir = %state.data_dir.display(), "starting server");
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Mentor Hub API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let sweeper = state.spawn_session_sweeper();
    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    sweeper.abort();

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
