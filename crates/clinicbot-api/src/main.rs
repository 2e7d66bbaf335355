//! Clinic assistant entry point.
//!
//! Binary name: `clinicbot`
//!
//! Parses CLI arguments, sets up tracing, loads configuration, then
//! dispatches to a subcommand or starts the interactive assistant.

mod cli;
mod state;

use clap::Parser;
use tracing::error;

use clinicbot_infra::config::ConfigOverrides;
use clinicbot_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::chat::loop_runner::{self, ChatExit};
use cli::{Cli, Commands, KeyCommand};
use state::AppState;

/// Exit status after an interrupt (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.otel, cli.log_directive())
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();

    match result {
        Ok(ChatExit::Finished) => Ok(()),
        Ok(ChatExit::Interrupted) => {
            // A prompt may still be blocked on stdin; do not wait for it.
            let _ = console::Term::stdout().show_cursor();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        Err(e) => Err(e),
    }
}

async fn run(cli: Cli) -> anyhow::Result<ChatExit> {
    let overrides = ConfigOverrides {
        model: cli.model.clone(),
        locale: cli.locale,
    };
    let state = AppState::init(cli.data_dir.clone(), &overrides).await?;

    match cli.command {
        None | Some(Commands::Chat) => return loop_runner::run(&state).await,

        Some(Commands::Key { action }) => {
            let credentials = state.credentials();
            match action {
                KeyCommand::Set { value } => {
                    cli::key::set_key(&credentials, value.as_deref(), cli.json)?
                }
                KeyCommand::Clear => cli::key::clear_key(&credentials, cli.json)?,
                KeyCommand::Status => cli::key::key_status(&credentials, cli.json)?,
            }
        }

        Some(Commands::Patients) => {
            cli::patients::list_patients(&state.patients().await, cli.json)?;
        }
    }

    Ok(ChatExit::Finished)
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
