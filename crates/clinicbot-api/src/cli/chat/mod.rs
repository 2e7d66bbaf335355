//! Interactive terminal front-end for the clinic assistant.
//!
//! One screen per session status: the welcome menu, the provisioning
//! progress bar, the binding form, the chat loop and the error screen.
//! Entry point: `loop_runner::run`.

pub mod banner;
pub mod binding;
pub mod commands;
pub mod display;
pub mod input;
pub mod loop_runner;
pub mod setup;
pub mod welcome;

/// What the driver loop should do after a screen returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run a blocking `dialoguer` prompt on the blocking pool.
///
/// Keeps the runtime free to observe Ctrl+C while the prompt waits.
pub async fn prompt<T, F>(ask: F) -> anyhow::Result<T>
where
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(ask).await??)
}
