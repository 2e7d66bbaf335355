//! Binding screen: verify the patient by phone number and birthday.

use std::time::Duration;

use anyhow::Result;
use console::style;
use dialoguer::Input;

use clinicbot_types::error::SessionError;

use super::{Flow, prompt};
use crate::state::ClinicOrchestrator;

async fn ask(label: String) -> Result<String> {
    let value: String = prompt(move || {
        Input::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
    })
    .await?;
    Ok(value.trim().to_string())
}

/// Run one verification attempt.
///
/// A blank phone number cancels: the session ends and its documents are
/// removed. A failed attempt shows the reason for `reset_after`, then
/// clears the form.
pub async fn run_binding(orch: &mut ClinicOrchestrator, reset_after: Duration) -> Result<Flow> {
    let catalog = *orch.catalog();

    println!();
    println!(
        "  {}",
        style(catalog.binding_title(&orch.session().document_label))
            .cyan()
            .bold()
    );
    println!("  {}", style("Leave the phone number blank to cancel").dim());
    println!();

    let phone = ask(catalog.phone_prompt()).await?;
    if phone.is_empty() {
        // Dropping the handle leaves deletion running in the background.
        let _cleanup = orch.end_session()?;
        println!("  {}", style("Session cancelled.").dim());
        return Ok(Flow::Continue);
    }
    let birthday = ask(catalog.birthday_prompt()).await?;

    match orch.verify_patient(&phone, &birthday).await {
        Ok(()) => Ok(Flow::Continue),
        Err(SessionError::Validation(_)) => {
            if let Some(message) = &orch.session().binding_error {
                println!("  {} {}", style("✗").red().bold(), style(message).red());
            }
            tokio::time::sleep(reset_after).await;
            orch.reset_binding_form();
            Ok(Flow::Continue)
        }
        Err(e) => Err(e.into()),
    }
}
