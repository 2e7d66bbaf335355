//! The session state machine.
//!
//! States: Initializing -> Welcome -> Uploading -> Binding -> Chatting,
//! plus Error. Every mutation of the `Session` goes through one of the
//! transition handlers below; they are `&mut self` methods, so a caller
//! sharing the orchestrator across tasks must put it behind a mutex.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use clinicbot_types::config::{ClinicConfig, PollConfig};
use clinicbot_types::error::{CredentialError, RagError, SessionError};
use clinicbot_types::event::SessionEvent;
use clinicbot_types::message::Message;
use clinicbot_types::rag::StoreId;
use clinicbot_types::session::{FileRef, Session, SessionStatus, UploadProgress};

use crate::credential::CredentialProbe;
use crate::crisis::CrisisDetector;
use crate::event::bus::SessionEventBus;
use crate::i18n::Catalog;
use crate::identity::{PatientDirectory, lookup_patient};
use crate::rag::gateway::RagGateway;
use crate::rag::poll::wait_for_operation;
use crate::rag::questions::questions_or_default;

/// Tunables for the orchestrator, usually derived from [`ClinicConfig`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub catalog: Catalog,
    pub poll: PollConfig,
    /// How long the "ready" progress state is held before Binding.
    pub ready_hold: Duration,
    pub crisis: CrisisDetector,
}

impl SessionSettings {
    pub fn from_config(config: &ClinicConfig) -> Self {
        Self {
            catalog: Catalog::new(config.locale),
            poll: config.poll.clone(),
            ready_hold: config.ready_hold(),
            crisis: CrisisDetector::with_extra_keywords(&config.extra_crisis_keywords),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&ClinicConfig::default())
    }
}

/// Result of a successful provisioning run.
struct Provisioned {
    store: StoreId,
    questions: Vec<String>,
}

/// Owns the client session and drives its lifecycle.
pub struct SessionOrchestrator<G, C, D>
where
    G: RagGateway + 'static,
    C: CredentialProbe,
    D: PatientDirectory,
{
    session: Session,
    gateway: Arc<G>,
    credentials: C,
    patients: D,
    settings: SessionSettings,
    events: SessionEventBus,
    credential_selected: bool,
    /// Store created by a setup that has not finished yet.
    provisioning_store: Option<StoreId>,
}

impl<G, C, D> SessionOrchestrator<G, C, D>
where
    G: RagGateway + 'static,
    C: CredentialProbe,
    D: PatientDirectory,
{
    /// Create an orchestrator in the `Initializing` state.
    pub fn new(gateway: Arc<G>, credentials: C, patients: D, settings: SessionSettings) -> Self {
        Self {
            session: Session::default(),
            gateway,
            credentials,
            patients,
            settings,
            events: SessionEventBus::default(),
            credential_selected: false,
            provisioning_store: None,
        }
    }

    // --- Accessors ---

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn catalog(&self) -> &Catalog {
        &self.settings.catalog
    }

    /// Last observed credential availability.
    pub fn credential_selected(&self) -> bool {
        self.credential_selected
    }

    /// Subscribe to status, progress and message events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // --- Startup and credentials ---

    /// Initializing -> Welcome.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionStatus::Initializing], "start")?;
        self.refresh_credential();
        self.transition(SessionStatus::Welcome);
        Ok(())
    }

    /// Re-check credential availability.
    ///
    /// Called whenever the front-end regains focus. Never changes status;
    /// only updates the flag that gates setup.
    pub fn refresh_credential(&mut self) -> bool {
        let selected = self.credentials.has_credential_selected();
        if selected != self.credential_selected {
            debug!(selected, "Credential availability changed");
        }
        self.credential_selected = selected;
        selected
    }

    /// Open the credential picker, then re-check availability.
    pub fn select_credential(&mut self) -> Result<bool, CredentialError> {
        self.credentials.open_credential_picker()?;
        let selected = self.refresh_credential();
        if selected {
            self.session.notice = None;
        }
        Ok(selected)
    }

    // --- Welcome: pending files ---

    /// Queue a document for the next setup run.
    pub fn add_pending_file(&mut self, file: FileRef) -> Result<(), SessionError> {
        self.require(&[SessionStatus::Welcome], "add file")?;
        debug!(file = %file.name, "File queued");
        self.session.pending_files.push(file);
        Ok(())
    }

    /// Remove a queued document by index.
    pub fn remove_pending_file(&mut self, index: usize) -> Result<Option<FileRef>, SessionError> {
        self.require(&[SessionStatus::Welcome], "remove file")?;
        if index < self.session.pending_files.len() {
            Ok(Some(self.session.pending_files.remove(index)))
        } else {
            Ok(None)
        }
    }

    // --- Welcome -> Uploading -> Binding / Welcome / Error ---

    /// Run the full setup: provision a store from the pending files.
    ///
    /// On success the session is in `Binding`. An invalid credential returns
    /// to `Welcome` with an inline notice; any other failure lands in
    /// `Error`. Both failure paths also return the underlying error.
    pub async fn start_setup(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionStatus::Welcome], "start setup")?;

        let credential = if self.credential_selected {
            self.credentials.selected_credential()
        } else {
            None
        };
        let Some(credential) = credential else {
            self.credential_selected = false;
            self.session.notice = Some(self.settings.catalog.credential_required());
            info!("Setup rejected: no credential selected");
            return Err(SessionError::CredentialRequired);
        };

        self.session.notice = None;
        self.session.error_text = None;
        self.transition(SessionStatus::Uploading);

        match self.provision(credential).await {
            Ok(provisioned) => {
                let label = self.document_label();
                info!(store_id = %provisioned.store, label = %label, "Knowledge base ready");

                self.session.pending_files.clear();
                self.session.document_label = label;
                self.provisioning_store = None;
                self.session.active_store_id = Some(provisioned.store);
                self.session.chat_history.clear();
                self.session.example_questions = provisioned.questions;
                self.session.upload_progress = None;
                self.transition(SessionStatus::Binding);
                Ok(())
            }
            Err(error) => {
                self.session.upload_progress = None;
                if let Some(store) = self.provisioning_store.take() {
                    self.spawn_delete(store);
                }

                if error.is_invalid_credential() {
                    warn!(error = %error, "Credential rejected during setup");
                    self.credential_selected = false;
                    self.session.notice = Some(self.settings.catalog.invalid_credential());
                    self.transition(SessionStatus::Welcome);
                } else {
                    warn!(error = %error, "Setup failed");
                    self.session.error_text =
                        Some(self.settings.catalog.provisioning_failed(&error.to_string()));
                    self.transition(SessionStatus::Error);
                }
                Err(SessionError::Provisioning(error))
            }
        }
    }

    /// Create store, upload each file in order, generate questions, hold ready.
    ///
    /// The store is recorded in `provisioning_store` as soon as it exists, so
    /// a failure or an abandoned setup can still delete it.
    async fn provision(&mut self, credential: SecretString) -> Result<Provisioned, RagError> {
        let gateway = Arc::clone(&self.gateway);
        let files = self.session.pending_files.clone();
        let total = files.len() + 2;

        gateway.initialize(credential)?;

        let step = self.settings.catalog.step_creating_store();
        self.report_progress(1, total, step, None);
        let display_name = format!("clinic-rag-{}", Utc::now().format("%Y%m%d-%H%M%S"));
        let store = gateway.create_store(&display_name).await?;
        self.provisioning_store = Some(store.clone());

        for (index, file) in files.iter().enumerate() {
            let step = self.settings.catalog.step_uploading();
            self.report_progress(index + 2, total, step, Some(file.name.clone()));
            let operation = gateway.upload_document(&store, file).await?;
            wait_for_operation(gateway.as_ref(), operation, &self.settings.poll).await?;
            debug!(file = %file.name, "Document ingested");
        }

        let step = self.settings.catalog.step_generating_questions();
        self.report_progress(total, total, step, None);
        let questions = questions_or_default(
            gateway.generate_suggested_questions(&store).await,
            &self.settings.catalog,
        )?;

        // Last step is relabelled in place; the step number does not advance.
        if let Some(progress) = self.session.upload_progress.as_mut() {
            progress.step_label = self.settings.catalog.step_ready();
        }
        if !self.settings.ready_hold.is_zero() {
            tokio::time::sleep(self.settings.ready_hold).await;
        }

        Ok(Provisioned { store, questions })
    }

    // --- Binding -> Chatting ---

    /// Verify the patient and open the chat with a personal greeting.
    ///
    /// On failure the session stays in `Binding` with an inline message;
    /// the front-end clears it with [`reset_binding_form`](Self::reset_binding_form).
    pub async fn verify_patient(
        &mut self,
        raw_phone: &str,
        raw_birthday: &str,
    ) -> Result<(), SessionError> {
        self.require(&[SessionStatus::Binding], "verify patient")?;

        match lookup_patient(&self.patients, raw_phone, raw_birthday).await {
            Ok(patient) => {
                info!(patient = %patient.name, "Patient verified");
                let greeting = self
                    .settings
                    .catalog
                    .welcome(&patient.name, &self.session.document_label);
                self.session.binding_error = None;
                self.session.patient = Some(patient);
                self.session.chat_history.clear();
                self.append(Message::model(greeting, Vec::new()));
                self.transition(SessionStatus::Chatting);
                Ok(())
            }
            Err(e) => {
                info!(error = %e, "Patient verification failed");
                self.session.binding_error = Some(self.settings.catalog.validation(&e));
                Err(e.into())
            }
        }
    }

    /// Clear a failed verification message.
    pub fn reset_binding_form(&mut self) {
        if self.session.status == SessionStatus::Binding {
            self.session.binding_error = None;
        }
    }

    // --- Chatting ---

    /// Send a patient message and append the reply.
    ///
    /// The crisis filter runs first; a match produces the fixed support
    /// reply without calling the gateway. Query failures become a single
    /// apologetic reply and never change the session status. Returns the
    /// reply, or `None` for blank input.
    pub async fn send_message(&mut self, text: &str) -> Result<Option<Message>, SessionError> {
        self.require(&[SessionStatus::Chatting], "send message")?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        self.append(Message::user(text));

        if let Some(reply) = self.settings.crisis.screen(text, &self.settings.catalog) {
            warn!("Crisis keyword detected, remote query skipped");
            self.append(reply.clone());
            return Ok(Some(reply));
        }

        let Some(store) = self.session.active_store_id.clone() else {
            return Err(SessionError::InvalidTransition {
                from: self.session.status,
                action: "send message",
            });
        };

        let reply = match self.gateway.query(&store, text).await {
            Ok(answer) if !answer.answer_text.trim().is_empty() => {
                Message::model(answer.answer_text, answer.source_chunks)
            }
            Ok(_) => {
                warn!(store_id = %store, "Empty answer from gateway");
                Message::model(self.settings.catalog.apology(), Vec::new())
            }
            Err(e) => {
                warn!(store_id = %store, error = %e, "Query failed");
                Message::model(self.settings.catalog.apology(), Vec::new())
            }
        };

        self.append(reply.clone());
        Ok(Some(reply))
    }

    /// Send one of the example questions by index.
    pub async fn ask_example(&mut self, index: usize) -> Result<Option<Message>, SessionError> {
        match self.session.example_questions.get(index).cloned() {
            Some(question) => self.send_message(&question).await,
            None => Ok(None),
        }
    }

    // --- Session end, errors and teardown ---

    /// Chatting (or Binding) -> Welcome.
    ///
    /// Requests deletion of the active store in the background; the
    /// transition never waits for it. The returned handle may be awaited
    /// or dropped.
    pub fn end_session(&mut self) -> Result<Option<JoinHandle<()>>, SessionError> {
        self.require(&[SessionStatus::Chatting, SessionStatus::Binding], "end session")?;

        let cleanup = self
            .session
            .active_store_id
            .take()
            .map(|store| self.spawn_delete(store));

        self.session.chat_history.clear();
        self.session.example_questions.clear();
        self.session.document_label.clear();
        self.session.pending_files.clear();
        self.session.patient = None;
        self.session.binding_error = None;
        self.transition(SessionStatus::Welcome);
        Ok(cleanup)
    }

    /// Error -> Welcome.
    pub fn acknowledge_error(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionStatus::Error], "acknowledge error")?;
        self.session.error_text = None;
        self.transition(SessionStatus::Welcome);
        Ok(())
    }

    /// Process-exit hook: request deletion of the store this session holds.
    ///
    /// Covers both the active store and one created by a setup that was
    /// abandoned mid-way (its future dropped by a shutdown signal). Consumes
    /// the orchestrator. The deletion is best-effort; callers may bound how
    /// long they wait on the returned handle.
    pub fn teardown(mut self) -> Option<JoinHandle<()>> {
        let store = self
            .session
            .active_store_id
            .take()
            .or_else(|| self.provisioning_store.take())?;
        info!(store_id = %store, status = %self.session.status, "Teardown: deleting store");
        Some(self.spawn_delete(store))
    }

    // --- Internals ---

    fn require(&self, allowed: &[SessionStatus], action: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.session.status) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.session.status,
                action,
            })
        }
    }

    fn transition(&mut self, to: SessionStatus) {
        let from = self.session.status;
        self.session.status = to;
        debug_assert_eq!(
            self.session.active_store_id.is_some(),
            to.holds_store(),
            "active store must be held exactly in Binding and Chatting"
        );
        info!(%from, %to, "Session transition");
        self.events.publish(SessionEvent::StatusChanged { from, to });
    }

    fn append(&mut self, message: Message) {
        self.session.chat_history.push(message.clone());
        self.events.publish(SessionEvent::MessageAppended(message));
    }

    fn report_progress(&mut self, current: usize, total: usize, step_label: String, file_label: Option<String>) {
        let progress = UploadProgress {
            current,
            total,
            step_label,
            file_label,
        };
        debug!(current, total, step = %progress.step_label, "Provisioning progress");
        self.session.upload_progress = Some(progress.clone());
        self.events.publish(SessionEvent::Progress(progress));
    }

    fn document_label(&self) -> String {
        let files = &self.session.pending_files;
        match files.as_slice() {
            [] => self.settings.catalog.generic_label(),
            [only] => only.name.clone(),
            [first, ..] => self.settings.catalog.documents_label(&first.name, files.len()),
        }
    }

    /// Fire-and-forget store deletion; failures are only logged.
    fn spawn_delete(&self, store: StoreId) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            match gateway.delete_store(&store).await {
                Ok(()) => info!(store_id = %store, "Store deleted"),
                Err(e) => warn!(store_id = %store, error = %e, "Store deletion failed"),
            }
        })
    }
}
