//! Welcome screen: queue documents, pick the API key, start setup.

use std::path::Path;

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select};

use clinicbot_infra::filesystem::file_ref_from_path;

use super::setup::run_setup;
use super::{Flow, prompt};
use crate::state::ClinicOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WelcomeAction {
    AddDocument,
    RemoveDocument,
    StartSetup,
    SelectKey,
    Quit,
}

impl WelcomeAction {
    fn label(self, has_key: bool) -> &'static str {
        match self {
            WelcomeAction::AddDocument => "Add a document",
            WelcomeAction::RemoveDocument => "Remove a document",
            WelcomeAction::StartSetup if has_key => "Start setup",
            WelcomeAction::StartSetup => "Start setup (select an API key first)",
            WelcomeAction::SelectKey => "Select API key",
            WelcomeAction::Quit => "Quit",
        }
    }
}

/// Menu entries offered for the current session.
fn actions(has_files: bool) -> Vec<WelcomeAction> {
    let mut actions = vec![WelcomeAction::AddDocument];
    if has_files {
        actions.push(WelcomeAction::RemoveDocument);
    }
    actions.extend([
        WelcomeAction::StartSetup,
        WelcomeAction::SelectKey,
        WelcomeAction::Quit,
    ]);
    actions
}

fn print_status(orch: &ClinicOrchestrator) {
    let session = orch.session();

    println!();
    if session.pending_files.is_empty() {
        println!(
            "  {} No documents queued. The assistant will use general knowledge only.",
            style("i").blue().bold()
        );
    } else {
        println!("  {}", style("Documents to upload:").bold());
        for (i, file) in session.pending_files.iter().enumerate() {
            println!(
                "  {}. {} {}",
                i + 1,
                file.name,
                style(format!("({})", file.mime_type)).dim()
            );
        }
    }

    if orch.credential_selected() {
        println!("  {} API key selected", style("✓").green().bold());
    } else {
        println!("  {} No API key selected", style("✗").red().bold());
    }

    if let Some(notice) = &session.notice {
        println!("  {} {}", style("!").yellow().bold(), style(notice).yellow());
    }
    println!();
}

async fn add_document(orch: &mut ClinicOrchestrator) -> Result<()> {
    let raw: String = prompt(|| {
        Input::new()
            .with_prompt("Path to document (blank to cancel)")
            .allow_empty(true)
            .interact_text()
    })
    .await?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(());
    }

    match file_ref_from_path(Path::new(raw)).await {
        Ok(file) => {
            println!("  {} Queued {}", style("+").green().bold(), style(&file.name).cyan());
            orch.add_pending_file(file)?;
        }
        Err(e) => println!("  {} Cannot use {raw}: {e}", style("✗").red().bold()),
    }
    Ok(())
}

async fn remove_document(orch: &mut ClinicOrchestrator) -> Result<()> {
    let names: Vec<String> = orch
        .session()
        .pending_files
        .iter()
        .map(|f| f.name.clone())
        .collect();
    let Some(index) = prompt(move || {
        Select::new()
            .with_prompt("Remove which document?")
            .items(&names)
            .default(0)
            .interact_opt()
    })
    .await?
    else {
        return Ok(());
    };

    if let Some(file) = orch.remove_pending_file(index)? {
        println!("  {} Removed {}", style("-").yellow().bold(), file.name);
    }
    Ok(())
}

fn select_key(orch: &mut ClinicOrchestrator) {
    match orch.select_credential() {
        Ok(true) => println!("  {} API key selected", style("✓").green().bold()),
        Ok(false) => println!("  {}", style("No API key selected.").dim()),
        Err(e) => println!("  {} {e}", style("✗").red().bold()),
    }
}

/// Show the welcome menu once and act on the choice.
pub async fn run_welcome(orch: &mut ClinicOrchestrator) -> Result<Flow> {
    orch.refresh_credential();
    print_status(orch);

    let has_key = orch.credential_selected();
    let actions = actions(!orch.session().pending_files.is_empty());
    let labels: Vec<&str> = actions.iter().map(|a| a.label(has_key)).collect();
    let default = actions
        .iter()
        .position(|a| *a == WelcomeAction::StartSetup)
        .unwrap_or(0);

    let Some(choice) = prompt(move || {
        Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(default)
            .interact_opt()
    })
    .await?
    else {
        return Ok(Flow::Continue);
    };

    match actions.get(choice).copied() {
        Some(WelcomeAction::AddDocument) => add_document(orch).await?,
        Some(WelcomeAction::RemoveDocument) => remove_document(orch).await?,
        Some(WelcomeAction::StartSetup) => run_setup(orch).await,
        Some(WelcomeAction::SelectKey) => select_key(orch),
        Some(WelcomeAction::Quit) | None => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}
