//! Provisioning screen: a progress bar fed by session events.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use clinicbot_types::error::SessionError;
use clinicbot_types::event::SessionEvent;
use clinicbot_types::session::UploadProgress;

use crate::state::ClinicOrchestrator;

/// Bar message for one progress snapshot.
pub fn progress_message(progress: &UploadProgress) -> String {
    match &progress.file_label {
        Some(file) => format!("{} {}", progress.step_label, file),
        None => progress.step_label.clone(),
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Run setup from the welcome screen.
///
/// The orchestrator decides the next status; failures are already
/// reflected in the session (notice or error text), so they are only
/// logged here.
pub async fn run_setup(orch: &mut ClinicOrchestrator) {
    let bar = ProgressBar::new(0);
    bar.set_style(bar_style());
    bar.enable_steady_tick(Duration::from_millis(80));

    let mut events = orch.subscribe();
    let tracker = {
        let bar = bar.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Progress(p)) => {
                        bar.set_length(p.total as u64);
                        bar.set_position(p.current as u64);
                        bar.set_message(progress_message(&p));
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        })
    };

    let result = orch.start_setup().await;
    tracker.abort();
    bar.finish_and_clear();

    match result {
        Ok(()) => println!(
            "  {} {}",
            style("✓").green().bold(),
            orch.catalog().step_ready()
        ),
        Err(SessionError::CredentialRequired) => {}
        Err(e) => debug!(error = %e, "Setup did not complete"),
    }
}
