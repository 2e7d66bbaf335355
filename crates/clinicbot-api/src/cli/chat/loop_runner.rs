//! Driver loop for the interactive assistant.
//!
//! Dispatches to one screen per session status until the operator quits,
//! then tears the session down so no uploaded documents outlive the
//! process. Ctrl+C and SIGTERM take the same teardown path.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline_async::SharedWriter;
use tracing::{info, warn};

use clinicbot_core::i18n::Catalog;
use clinicbot_types::session::SessionStatus;

use super::banner::print_banner;
use super::binding::run_binding;
use super::commands::{self, ChatCommand};
use super::display::format_message;
use super::input::{ChatInput, InputEvent};
use super::welcome::run_welcome;
use super::{Flow, prompt};
use crate::shutdown_signal;
use crate::state::{AppState, ClinicOrchestrator};

/// How long teardown waits for the store deletion before giving up.
const TEARDOWN_GRACE: Duration = Duration::from_secs(3);

/// How the interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatExit {
    Finished,
    Interrupted,
}

/// Run the assistant until the operator quits or a shutdown signal arrives.
pub async fn run(state: &AppState) -> anyhow::Result<ChatExit> {
    let mut orch = state.build_orchestrator().await?;
    orch.start()?;
    print_banner(&state.config.model, state.config.locale, &state.data_dir);

    let (outcome, exit) = tokio::select! {
        result = drive(state, &mut orch) => (result, ChatExit::Finished),
        () = shutdown_signal() => {
            println!("\n  {}", style("Interrupted, ending session...").dim());
            (Ok(()), ChatExit::Interrupted)
        }
    };

    if let Err(e) = &outcome {
        warn!(error = %e, "Assistant stopped with an error");
    }

    if let Some(cleanup) = orch.teardown() {
        println!("  {}", style("Removing uploaded documents...").dim());
        match tokio::time::timeout(TEARDOWN_GRACE, cleanup).await {
            Ok(_) => info!("Teardown complete"),
            Err(_) => warn!(grace_secs = TEARDOWN_GRACE.as_secs(), "Teardown timed out"),
        }
    }

    outcome.map(|()| exit)
}

async fn drive(state: &AppState, orch: &mut ClinicOrchestrator) -> anyhow::Result<()> {
    loop {
        let flow = match orch.status() {
            SessionStatus::Initializing => {
                orch.start()?;
                Flow::Continue
            }
            SessionStatus::Welcome => run_welcome(orch).await?,
            SessionStatus::Binding => run_binding(orch, state.config.binding_reset()).await?,
            SessionStatus::Chatting => run_chat(orch).await?,
            SessionStatus::Error => run_error(orch).await?,
            SessionStatus::Uploading => {
                anyhow::bail!("setup returned while still uploading")
            }
        };

        if flow == Flow::Quit {
            println!("\n  {}", style("Goodbye.").dim());
            return Ok(());
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn emit(out: &mut SharedWriter, text: &str) {
    let _ = write!(out, "{text}");
}

/// Send a message with a spinner and print the reply.
async fn ask(orch: &mut ClinicOrchestrator, out: &mut SharedWriter, text: &str) -> anyhow::Result<()> {
    let catalog = *orch.catalog();
    let thinking = spinner("thinking...");
    let reply = orch.send_message(text).await;
    thinking.finish_and_clear();

    if let Some(reply) = reply? {
        emit(out, &format!("\n{}\n", format_message(&reply, &catalog)));
    }
    Ok(())
}

fn history_text(orch: &ClinicOrchestrator, catalog: &Catalog) -> String {
    orch.session()
        .chat_history
        .iter()
        .map(|m| format!("\n{}", format_message(m, catalog)))
        .collect()
}

/// Chat screen. Returns to the welcome menu on `/end`, quits on `/exit`
/// or end of input; teardown removes the store in the latter case.
async fn run_chat(orch: &mut ClinicOrchestrator) -> anyhow::Result<Flow> {
    let catalog = *orch.catalog();
    let label = style(format!("{} >", catalog.patient_label())).green().bold();
    let (mut input, mut out) =
        ChatInput::new(format!("  {label} ")).context("Failed to initialize input")?;

    emit(&mut out, &history_text(orch, &catalog));
    emit(
        &mut out,
        &commands::questions_text(&catalog.example_questions_title(), &orch.session().example_questions),
    );
    emit(
        &mut out,
        &format!("\n  {}\n\n", style("Type /help for commands").dim()),
    );

    loop {
        let text = match input.read_line().await {
            InputEvent::Eof | InputEvent::Interrupted => return Ok(Flow::Quit),
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        let Some(command) = commands::parse(&text) else {
            ask(orch, &mut out, &text).await?;
            continue;
        };

        match command {
            ChatCommand::Help => emit(&mut out, &commands::help_text()),
            ChatCommand::Questions => emit(
                &mut out,
                &commands::questions_text(
                    &catalog.example_questions_title(),
                    &orch.session().example_questions,
                ),
            ),
            ChatCommand::Ask(index) => match orch.session().example_questions.get(index).cloned() {
                Some(question) => {
                    emit(&mut out, &format!("  {label} {question}\n"));
                    ask(orch, &mut out, &question).await?;
                }
                None => emit(
                    &mut out,
                    &format!("  {} No question {}\n", style("?").yellow().bold(), index + 1),
                ),
            },
            ChatCommand::History => emit(&mut out, &history_text(orch, &catalog)),
            ChatCommand::Clear => input.clear(),
            ChatCommand::End => {
                // The deletion keeps running after the handle is dropped.
                let _cleanup = orch.end_session()?;
                drop(input);
                println!("\n  {}", style("Session ended. Documents are being removed.").dim());
                return Ok(Flow::Continue);
            }
            ChatCommand::Exit => return Ok(Flow::Quit),
            ChatCommand::Unknown(name) => emit(
                &mut out,
                &format!(
                    "  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                ),
            ),
        }
    }
}

/// Error screen: show the failure and go back to the welcome menu.
async fn run_error(orch: &mut ClinicOrchestrator) -> anyhow::Result<Flow> {
    let text = orch.session().error_text.clone().unwrap_or_default();
    println!();
    println!("  {} {}", style("✗").red().bold(), style(text).red());
    println!();

    let back = prompt(|| {
        dialoguer::Confirm::new()
            .with_prompt("Return to the welcome screen?")
            .default(true)
            .interact_opt()
    })
    .await?;

    orch.acknowledge_error()?;
    Ok(if back == Some(false) { Flow::Quit } else { Flow::Continue })
}
