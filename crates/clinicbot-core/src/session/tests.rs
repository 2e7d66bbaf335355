use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;

use clinicbot_types::config::{Locale, PollConfig};
use clinicbot_types::error::{RagError, SessionError, ValidationError};
use clinicbot_types::event::SessionEvent;
use clinicbot_types::message::{MessageRole, SourceChunk};
use clinicbot_types::patient::Patient;
use clinicbot_types::rag::{Operation, QueryAnswer, StoreId};
use clinicbot_types::session::{FileRef, SessionStatus, UploadProgress};

use super::{SessionOrchestrator, SessionSettings};
use crate::credential::CredentialProbe;
use crate::crisis::CrisisDetector;
use crate::i18n::Catalog;
use crate::identity::PatientDirectory;
use crate::rag::gateway::RagGateway;

// --- Test doubles ---

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateStore,
    Upload(String),
    Poll(String),
    Query(String),
    Questions,
    Delete(String),
}

#[derive(Default)]
enum QuestionsReply {
    #[default]
    List,
    Malformed,
    Unavailable,
}

/// Gateway that records every remote call and fails on demand.
#[derive(Default)]
struct RecordingGateway {
    calls: Mutex<Vec<Call>>,
    initialized: Mutex<bool>,
    create_error: Option<String>,
    upload_error: Option<String>,
    /// Upload never completes, like a connection that stalls.
    upload_hangs: bool,
    query_fails: bool,
    delete_fails: bool,
    questions: QuestionsReply,
}

impl RecordingGateway {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn deletes(&self) -> usize {
        self.count(|c| matches!(c, Call::Delete(_)))
    }
}

impl RagGateway for RecordingGateway {
    fn name(&self) -> &str {
        "recording"
    }

    fn initialize(&self, _api_key: SecretString) -> Result<(), RagError> {
        *self.initialized.lock().unwrap() = true;
        Ok(())
    }

    async fn create_store(&self, display_name: &str) -> Result<StoreId, RagError> {
        self.record(Call::CreateStore);
        assert!(display_name.starts_with("clinic-rag-"));
        match &self.create_error {
            Some(msg) => Err(RagError::Remote(msg.clone())),
            None => Ok(StoreId::new("fileSearchStores/test-store")),
        }
    }

    async fn upload_document(&self, _store: &StoreId, file: &FileRef) -> Result<Operation, RagError> {
        self.record(Call::Upload(file.name.clone()));
        if let Some(msg) = &self.upload_error {
            return Err(RagError::Remote(msg.clone()));
        }
        if self.upload_hangs {
            std::future::pending::<()>().await;
        }
        Ok(Operation {
            name: format!("operations/{}", file.name),
            done: false,
            error: None,
        })
    }

    async fn poll_operation(&self, operation: &Operation) -> Result<Operation, RagError> {
        self.record(Call::Poll(operation.name.clone()));
        Ok(Operation::completed(operation.name.clone()))
    }

    async fn query(&self, _store: &StoreId, text: &str) -> Result<QueryAnswer, RagError> {
        self.record(Call::Query(text.to_string()));
        if self.query_fails {
            return Err(RagError::Remote("503 Service Unavailable".to_string()));
        }
        Ok(QueryAnswer {
            answer_text: "門診時間為**週一至週五**。".to_string(),
            source_chunks: vec![SourceChunk {
                retrieved_text: Some("門診時間：週一至週五 09:00-17:00".to_string()),
            }],
        })
    }

    async fn generate_suggested_questions(&self, _store: &StoreId) -> Result<Vec<String>, RagError> {
        self.record(Call::Questions);
        match self.questions {
            QuestionsReply::List => Ok(vec!["幾點開門？".to_string(), "可以停車嗎？".to_string()]),
            QuestionsReply::Malformed => Err(RagError::Parse("not json".to_string())),
            QuestionsReply::Unavailable => Err(RagError::Remote("500 Internal".to_string())),
        }
    }

    async fn delete_store(&self, store: &StoreId) -> Result<(), RagError> {
        self.record(Call::Delete(store.to_string()));
        if self.delete_fails {
            return Err(RagError::Remote("HTTP 500: backend error".to_string()));
        }
        Ok(())
    }
}

/// Credential source the test can flip after handing it over.
#[derive(Clone, Default)]
struct SharedCredential(Arc<Mutex<Option<String>>>);

impl SharedCredential {
    fn with_key() -> Self {
        let cred = Self::default();
        cred.set(Some("test-key"));
        cred
    }

    fn set(&self, key: Option<&str>) {
        *self.0.lock().unwrap() = key.map(str::to_string);
    }
}

impl CredentialProbe for SharedCredential {
    fn selected_credential(&self) -> Option<SecretString> {
        self.0.lock().unwrap().clone().map(SecretString::from)
    }
}

struct Fixture(Vec<Patient>);

impl PatientDirectory for Fixture {
    async fn find_by_phone(&self, phone_key: &str) -> Option<Patient> {
        self.0.iter().find(|p| p.phone_key == phone_key).cloned()
    }
}

fn patients() -> Fixture {
    Fixture(vec![Patient {
        name: "王小明".to_string(),
        phone_key: "0912345678".to_string(),
        birthday_key: "1990-05-17".to_string(),
    }])
}

fn settings() -> SessionSettings {
    SessionSettings {
        catalog: Catalog::new(Locale::ZhTw),
        poll: PollConfig {
            initial_interval_ms: 0,
            max_interval_ms: 0,
            multiplier: 1.0,
            max_attempts: 5,
        },
        ready_hold: Duration::ZERO,
        crisis: CrisisDetector::default(),
    }
}

fn file(name: &str) -> FileRef {
    FileRef {
        path: PathBuf::from(format!("/tmp/{name}")),
        name: name.to_string(),
        mime_type: "application/pdf".to_string(),
    }
}

type Orchestrator = SessionOrchestrator<RecordingGateway, SharedCredential, Fixture>;

fn orchestrator(gateway: RecordingGateway, credential: SharedCredential) -> (Orchestrator, Arc<RecordingGateway>) {
    let gateway = Arc::new(gateway);
    let mut orch = SessionOrchestrator::new(Arc::clone(&gateway), credential, patients(), settings());
    orch.start().unwrap();
    (orch, gateway)
}

async fn chatting(gateway: RecordingGateway) -> (Orchestrator, Arc<RecordingGateway>) {
    let (mut orch, gateway) = orchestrator(gateway, SharedCredential::with_key());
    orch.start_setup().await.unwrap();
    orch.verify_patient("0912-345-678", "1990/05/17").await.unwrap();
    (orch, gateway)
}

/// Let spawned fire-and-forget deletions run.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn progress_events(rx: &mut tokio::sync::broadcast::Receiver<SessionEvent>) -> Vec<UploadProgress> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Progress(p) = event {
            out.push(p);
        }
    }
    out
}

fn assert_strictly_increasing(progress: &[UploadProgress]) {
    let steps: Vec<usize> = progress.iter().map(|p| p.current).collect();
    assert!(
        steps.windows(2).all(|w| w[0] < w[1]),
        "progress steps must strictly increase: {steps:?}"
    );
}

// --- Startup and credential gating ---

#[tokio::test]
async fn start_enters_welcome_and_reads_credential() {
    let (orch, _) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    assert_eq!(orch.status(), SessionStatus::Welcome);
    assert!(orch.credential_selected());
    assert!(orch.session().active_store_id.is_none());
}

#[tokio::test]
async fn setup_without_credential_stays_in_welcome() {
    let (mut orch, gateway) = orchestrator(RecordingGateway::default(), SharedCredential::default());
    let err = orch.start_setup().await.unwrap_err();

    assert!(matches!(err, SessionError::CredentialRequired));
    assert_eq!(orch.status(), SessionStatus::Welcome);
    assert_eq!(orch.session().notice, Some(orch.catalog().credential_required()));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn refresh_picks_up_newly_selected_credential() {
    let credential = SharedCredential::default();
    let (mut orch, _) = orchestrator(RecordingGateway::default(), credential.clone());
    assert!(!orch.credential_selected());

    credential.set(Some("late-key"));
    assert!(orch.refresh_credential());
    assert_eq!(orch.status(), SessionStatus::Welcome);
    orch.start_setup().await.unwrap();
    assert_eq!(orch.status(), SessionStatus::Binding);
}

// --- Provisioning ---

#[tokio::test]
async fn zero_files_makes_exactly_two_remote_calls() {
    let (mut orch, gateway) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    let mut rx = orch.subscribe();

    orch.start_setup().await.unwrap();

    assert_eq!(gateway.calls(), vec![Call::CreateStore, Call::Questions]);
    assert!(*gateway.initialized.lock().unwrap());
    assert_eq!(orch.status(), SessionStatus::Binding);
    assert_eq!(orch.session().document_label, orch.catalog().generic_label());
    assert_eq!(
        orch.session().active_store_id,
        Some(StoreId::new("fileSearchStores/test-store"))
    );
    assert_eq!(orch.session().example_questions.len(), 2);
    assert!(orch.session().upload_progress.is_none());

    let progress = progress_events(&mut rx);
    assert!(progress.iter().all(|p| p.total == 2));
    assert_eq!(progress.first().map(|p| p.current), Some(1));
    assert_eq!(progress.last().map(|p| p.current), Some(2));
    assert_strictly_increasing(&progress);
}

#[tokio::test]
async fn uploads_each_file_in_order_with_progress() {
    let (mut orch, gateway) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        orch.add_pending_file(file(name)).unwrap();
    }
    let mut rx = orch.subscribe();

    orch.start_setup().await.unwrap();

    assert_eq!(
        gateway.calls(),
        vec![
            Call::CreateStore,
            Call::Upload("a.pdf".into()),
            Call::Poll("operations/a.pdf".into()),
            Call::Upload("b.pdf".into()),
            Call::Poll("operations/b.pdf".into()),
            Call::Upload("c.pdf".into()),
            Call::Poll("operations/c.pdf".into()),
            Call::Questions,
        ]
    );

    let progress = progress_events(&mut rx);
    assert!(progress.iter().all(|p| p.total == 5));
    let steps: Vec<usize> = progress.iter().map(|p| p.current).collect();
    assert_eq!(steps, vec![1, 2, 3, 4, 5]);
    assert_strictly_increasing(&progress);
    assert_eq!(progress[1].file_label.as_deref(), Some("a.pdf"));
    assert_eq!(progress[3].file_label.as_deref(), Some("c.pdf"));

    let last = progress.last().unwrap();
    assert_eq!(last.current, last.total);
    assert_eq!(last.step_label, orch.catalog().step_generating_questions());

    assert_eq!(orch.session().document_label, orch.catalog().documents_label("a.pdf", 3));
    assert!(orch.session().pending_files.is_empty());
}

#[tokio::test]
async fn single_file_label_is_its_name() {
    let (mut orch, _) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    orch.add_pending_file(file("衛教手冊.pdf")).unwrap();
    orch.start_setup().await.unwrap();
    assert_eq!(orch.session().document_label, "衛教手冊.pdf");
}

#[tokio::test]
async fn pending_files_can_be_removed() {
    let (mut orch, _) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    orch.add_pending_file(file("a.pdf")).unwrap();
    orch.add_pending_file(file("b.pdf")).unwrap();

    let removed = orch.remove_pending_file(0).unwrap();
    assert_eq!(removed.map(|f| f.name), Some("a.pdf".to_string()));
    assert!(orch.remove_pending_file(5).unwrap().is_none());
    assert_eq!(orch.session().pending_files.len(), 1);
}

#[tokio::test]
async fn malformed_questions_fall_back_to_defaults() {
    let gateway = RecordingGateway {
        questions: QuestionsReply::Malformed,
        ..Default::default()
    };
    let (mut orch, _) = orchestrator(gateway, SharedCredential::with_key());
    orch.start_setup().await.unwrap();

    assert_eq!(orch.status(), SessionStatus::Binding);
    assert_eq!(orch.session().example_questions, orch.catalog().default_questions());
}

#[tokio::test]
async fn invalid_credential_returns_to_welcome() {
    let gateway = RecordingGateway {
        create_error: Some("400 Bad Request: API key not valid. Please pass a valid API key.".into()),
        ..Default::default()
    };
    let (mut orch, gateway) = orchestrator(gateway, SharedCredential::with_key());

    let err = orch.start_setup().await.unwrap_err();
    settle().await;

    assert!(matches!(err, SessionError::Provisioning(_)));
    assert_eq!(orch.status(), SessionStatus::Welcome);
    assert!(!orch.credential_selected());
    assert_eq!(orch.session().notice, Some(orch.catalog().invalid_credential()));
    assert!(orch.session().error_text.is_none());
    assert!(orch.session().active_store_id.is_none());
    assert_eq!(gateway.deletes(), 0);
}

#[tokio::test]
async fn upload_failure_enters_error_and_cleans_up_partial_store() {
    let gateway = RecordingGateway {
        upload_error: Some("unsupported file type".into()),
        ..Default::default()
    };
    let (mut orch, gateway) = orchestrator(gateway, SharedCredential::with_key());
    orch.add_pending_file(file("scan.heic")).unwrap();

    orch.start_setup().await.unwrap_err();
    settle().await;

    assert_eq!(orch.status(), SessionStatus::Error);
    let text = orch.session().error_text.clone().unwrap();
    assert!(text.contains("unsupported file type"));
    assert!(orch.session().active_store_id.is_none());
    assert_eq!(gateway.deletes(), 1);

    orch.acknowledge_error().unwrap();
    assert_eq!(orch.status(), SessionStatus::Welcome);
    assert!(orch.session().error_text.is_none());
}

#[tokio::test]
async fn question_service_failure_is_a_provisioning_failure() {
    let gateway = RecordingGateway {
        questions: QuestionsReply::Unavailable,
        ..Default::default()
    };
    let (mut orch, gateway) = orchestrator(gateway, SharedCredential::with_key());

    orch.start_setup().await.unwrap_err();
    settle().await;

    assert_eq!(orch.status(), SessionStatus::Error);
    assert_eq!(gateway.deletes(), 1);
}

// --- Binding ---

#[tokio::test]
async fn failed_verification_stays_in_binding() {
    let (mut orch, _) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    orch.start_setup().await.unwrap();

    let err = orch.verify_patient("0912345678", "2000-01-01").await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Validation(ValidationError::BirthdayMismatch)
    ));
    assert_eq!(orch.status(), SessionStatus::Binding);
    assert!(orch.session().binding_error.is_some());
    assert!(orch.session().chat_history.is_empty());

    orch.reset_binding_form();
    assert!(orch.session().binding_error.is_none());
}

#[tokio::test]
async fn verification_seeds_personal_greeting() {
    let (orch, _) = chatting(RecordingGateway::default()).await;

    assert_eq!(orch.status(), SessionStatus::Chatting);
    let history = &orch.session().chat_history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, MessageRole::Model);
    assert!(history[0].text.contains("王小明"));
    assert!(history[0].text.contains(&orch.catalog().generic_label()));
}

// --- Chatting ---

#[tokio::test]
async fn crisis_message_never_reaches_gateway() {
    let (mut orch, gateway) = chatting(RecordingGateway::default()).await;

    let reply = orch.send_message("我想自殺").await.unwrap().unwrap();

    assert!(reply.is_crisis);
    assert_eq!(reply.text, orch.catalog().crisis_response());
    assert_eq!(gateway.count(|c| matches!(c, Call::Query(_))), 0);

    let history = &orch.session().chat_history;
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].role, MessageRole::User);
    assert!(history[2].is_crisis);
}

#[tokio::test]
async fn query_failure_appends_single_apology() {
    let gateway = RecordingGateway {
        query_fails: true,
        ..Default::default()
    };
    let (mut orch, _) = chatting(gateway).await;

    orch.send_message("請問幾點開門？").await.unwrap();

    let history = &orch.session().chat_history;
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].text, orch.catalog().apology());
    assert!(history[2].source_chunks.is_empty());
    assert_eq!(orch.status(), SessionStatus::Chatting);
}

#[tokio::test]
async fn grounded_answer_keeps_source_chunks() {
    let (mut orch, gateway) = chatting(RecordingGateway::default()).await;

    let reply = orch.send_message("  請問幾點開門？ ").await.unwrap().unwrap();

    assert_eq!(reply.role, MessageRole::Model);
    assert_eq!(reply.source_chunks.len(), 1);
    assert!(gateway.calls().contains(&Call::Query("請問幾點開門？".into())));
}

#[tokio::test]
async fn example_question_is_sent_as_user_text() {
    let (mut orch, gateway) = chatting(RecordingGateway::default()).await;

    orch.ask_example(1).await.unwrap();
    assert!(gateway.calls().contains(&Call::Query("可以停車嗎？".into())));
    assert!(orch.ask_example(9).await.unwrap().is_none());
}

#[tokio::test]
async fn blank_message_is_ignored() {
    let (mut orch, gateway) = chatting(RecordingGateway::default()).await;

    assert!(orch.send_message("   ").await.unwrap().is_none());
    assert_eq!(orch.session().chat_history.len(), 1);
    assert_eq!(gateway.count(|c| matches!(c, Call::Query(_))), 0);
}

#[tokio::test]
async fn chat_outside_chatting_is_rejected() {
    let (mut orch, _) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    let err = orch.send_message("hello").await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            from: SessionStatus::Welcome,
            ..
        }
    ));
}

// --- Ending and teardown ---

#[tokio::test]
async fn end_session_deletes_store_once_and_resets() {
    let (mut orch, gateway) = chatting(RecordingGateway::default()).await;
    orch.send_message("請問幾點開門？").await.unwrap();

    let cleanup = orch.end_session().unwrap().expect("store deletion requested");
    assert_eq!(orch.status(), SessionStatus::Welcome);
    cleanup.await.unwrap();

    assert_eq!(gateway.deletes(), 1);
    let session = orch.session();
    assert!(session.active_store_id.is_none());
    assert!(session.chat_history.is_empty());
    assert!(session.example_questions.is_empty());
    assert!(session.document_label.is_empty());
    assert!(session.patient.is_none());

    assert!(orch.end_session().is_err());
    settle().await;
    assert_eq!(gateway.deletes(), 1);
}

#[tokio::test]
async fn teardown_deletes_active_store() {
    let (orch, gateway) = chatting(RecordingGateway::default()).await;
    orch.teardown().unwrap().await.unwrap();
    assert_eq!(
        gateway.calls().last(),
        Some(&Call::Delete("fileSearchStores/test-store".into()))
    );
}

#[tokio::test]
async fn ready_hold_relabels_last_step_without_advancing() {
    let gateway = Arc::new(RecordingGateway::default());
    let mut settings = settings();
    settings.ready_hold = Duration::from_millis(200);
    let mut orch =
        SessionOrchestrator::new(Arc::clone(&gateway), SharedCredential::with_key(), patients(), settings);
    orch.start().unwrap();
    let mut rx = orch.subscribe();

    let held = tokio::time::timeout(Duration::from_millis(50), orch.start_setup()).await;
    assert!(held.is_err(), "setup should still be holding the ready state");

    let progress = orch.session().upload_progress.clone().unwrap();
    assert_eq!((progress.current, progress.total), (2, 2));
    assert_eq!(progress.step_label, orch.catalog().step_ready());
    assert_strictly_increasing(&progress_events(&mut rx));
    orch.teardown().unwrap().await.unwrap();
}

#[tokio::test]
async fn abandoned_setup_store_is_deleted_on_teardown() {
    let gateway = RecordingGateway {
        upload_hangs: true,
        ..Default::default()
    };
    let (mut orch, gateway) = orchestrator(gateway, SharedCredential::with_key());
    orch.add_pending_file(file("a.pdf")).unwrap();

    let interrupted = tokio::time::timeout(Duration::from_millis(50), orch.start_setup()).await;
    assert!(interrupted.is_err());
    assert_eq!(orch.status(), SessionStatus::Uploading);
    assert!(orch.session().active_store_id.is_none());

    orch.teardown()
        .expect("partial store deletion requested")
        .await
        .unwrap();
    assert_eq!(
        gateway.calls(),
        vec![
            Call::CreateStore,
            Call::Upload("a.pdf".into()),
            Call::Delete("fileSearchStores/test-store".into()),
        ]
    );
}

#[tokio::test]
async fn end_session_resets_even_when_deletion_fails() {
    let (mut orch, gateway) = chatting(RecordingGateway {
        delete_fails: true,
        ..Default::default()
    })
    .await;
    orch.send_message("請問幾點開門？").await.unwrap();

    let cleanup = orch.end_session().unwrap().expect("store deletion requested");
    cleanup.await.unwrap();

    assert_eq!(gateway.deletes(), 1);
    assert_eq!(orch.status(), SessionStatus::Welcome);
    let session = orch.session();
    assert!(session.active_store_id.is_none());
    assert!(session.chat_history.is_empty());
    assert!(session.example_questions.is_empty());
    assert!(session.document_label.is_empty());
    assert!(session.error_text.is_none());
    assert!(session.notice.is_none());
}

#[tokio::test]
async fn teardown_tolerates_failed_deletion() {
    let (orch, gateway) = chatting(RecordingGateway {
        delete_fails: true,
        ..Default::default()
    })
    .await;
    orch.teardown().unwrap().await.unwrap();
    assert_eq!(gateway.deletes(), 1);
}

#[tokio::test]
async fn teardown_without_store_is_a_noop() {
    let (orch, gateway) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    assert!(orch.teardown().is_none());
    assert_eq!(gateway.deletes(), 0);
}

#[tokio::test]
async fn status_events_follow_transitions() {
    let (mut orch, _) = orchestrator(RecordingGateway::default(), SharedCredential::with_key());
    let mut rx = orch.subscribe();

    orch.start_setup().await.unwrap();

    let mut transitions = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::StatusChanged { from, to } = event {
            transitions.push((from, to));
        }
    }
    assert_eq!(
        transitions,
        vec![
            (SessionStatus::Welcome, SessionStatus::Uploading),
            (SessionStatus::Uploading, SessionStatus::Binding),
        ]
    );
}
