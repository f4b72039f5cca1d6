//! Counsel CLI and REST API entry point.
//!
//! Binary name: `counsel`
//!
//! Parses CLI arguments, opens the database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,counsel=debug",
        _ => "trace",
    };
    counsel_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "counsel", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = run(cli, state).await;

    counsel_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Advisors => cli::advisor::list_advisors(&state, cli.json)?,

        Commands::Advisor { id } => cli::advisor::show_advisor(&state, &id, cli.json)?,

        Commands::New { title, owner } => {
            cli::conversation::new_conversation(&state, title, owner, cli.json).await?;
        }

        Commands::Conversations { owner } => {
            cli::conversation::list_conversations(&state, owner, cli.json).await?;
        }

        Commands::Delete { id, force } => {
            cli::conversation::delete_conversation(&state, &id, force, cli.json).await?;
        }

        Commands::Send { id, text } => {
            cli::conversation::send_message(&state, &id, &text, cli.json, cli.quiet).await?;
        }

        Commands::History { id } => {
            cli::conversation::show_history(&state, &id, cli.json).await?;
        }

        Commands::Memory { id } => {
            cli::conversation::show_memory(&state, &id, cli.json).await?;
        }

        Commands::Chat { id } => {
            cli::chat::loop_runner::run_chat_loop(&state, id).await?;
        }

        Commands::Analyze { symbol } => {
            cli::analyze::analyze(&state, &symbol, cli.json, cli.quiet).await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Counsel API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {}  {}",
                console::style("Data:").bold(),
                console::style(state.data_dir.display()).dim()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
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
