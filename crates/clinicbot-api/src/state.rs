//! Application state wiring the orchestrator to concrete infrastructure.
//!
//! The orchestrator is generic over gateway/credential/directory traits;
//! `AppState` pins it to the Gemini gateway, the env/keychain credential
//! store and the mock patient directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use clinicbot_core::rag::box_gateway::BoxRagGateway;
use clinicbot_core::session::{SessionOrchestrator, SessionSettings};
use clinicbot_infra::config::{ConfigOverrides, apply_overrides, load_config};
use clinicbot_infra::credential::CredentialStore;
use clinicbot_infra::filesystem::resolve_data_dir;
use clinicbot_infra::gemini::GeminiGateway;
use clinicbot_infra::patients::MockPatientDirectory;
use clinicbot_types::config::ClinicConfig;

use crate::cli::key::prompt_for_key;

/// The orchestrator pinned to the production adapters.
pub type ClinicOrchestrator =
    SessionOrchestrator<BoxRagGateway, CredentialStore, MockPatientDirectory>;

/// Resolved configuration shared by every command.
pub struct AppState {
    pub config: ClinicConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory and load `config.toml` with CLI overrides.
    pub async fn init(
        data_dir: Option<PathBuf>,
        overrides: &ConfigOverrides,
    ) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(resolve_data_dir);
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = apply_overrides(load_config(&data_dir).await, overrides);
        tracing::debug!(
            data_dir = %data_dir.display(),
            model = %config.model,
            locale = %config.locale,
            "Configuration loaded"
        );

        Ok(Self { config, data_dir })
    }

    /// Credential store with the interactive picker attached.
    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new().with_prompt(prompt_for_key)
    }

    pub async fn patients(&self) -> MockPatientDirectory {
        MockPatientDirectory::load_or_builtin(self.config.patients_file.as_deref()).await
    }

    /// Build a fresh orchestrator in the `Initializing` state.
    pub async fn build_orchestrator(&self) -> anyhow::Result<ClinicOrchestrator> {
        let gateway = GeminiGateway::new(&self.config).context("Failed to create Gemini client")?;
        let gateway = Arc::new(BoxRagGateway::new(gateway));
        Ok(SessionOrchestrator::new(
            gateway,
            self.credentials(),
            self.patients().await,
            SessionSettings::from_config(&self.config),
        ))
    }
}
