//! Session record and lifecycle status types.
//!
//! Exactly one `Session` exists per running client. It is owned by the
//! session orchestrator in `clinicbot-core` and mutated only through its
//! transition handlers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::patient::Patient;
use crate::rag::StoreId;

/// Lifecycle status of the client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Initializing,
    Welcome,
    Uploading,
    Binding,
    Chatting,
    Error,
}

impl SessionStatus {
    /// Whether a remote store must be active while in this status.
    pub fn holds_store(&self) -> bool {
        matches!(self, SessionStatus::Binding | SessionStatus::Chatting)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Initializing => write!(f, "initializing"),
            SessionStatus::Welcome => write!(f, "welcome"),
            SessionStatus::Uploading => write!(f, "uploading"),
            SessionStatus::Binding => write!(f, "binding"),
            SessionStatus::Chatting => write!(f, "chatting"),
            SessionStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initializing" => Ok(SessionStatus::Initializing),
            "welcome" => Ok(SessionStatus::Welcome),
            "uploading" => Ok(SessionStatus::Uploading),
            "binding" => Ok(SessionStatus::Binding),
            "chatting" => Ok(SessionStatus::Chatting),
            "error" => Ok(SessionStatus::Error),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Initializing
    }
}

/// A local document queued for upload into the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Location of the file on disk.
    pub path: PathBuf,
    /// Display name (usually the file's basename).
    pub name: String,
    /// MIME type sent with the upload.
    pub mime_type: String,
}

/// Snapshot of the provisioning sequence, replaced wholesale on each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    /// 1-based step number.
    pub current: usize,
    /// Total step count (`file_count + 2`).
    pub total: usize,
    /// Localized description of the running step.
    pub step_label: String,
    /// Name of the file being uploaded, for upload steps only.
    pub file_label: Option<String>,
}

impl UploadProgress {
    /// Fraction of the sequence completed, in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current as f64 / self.total as f64).min(1.0)
    }
}

/// The single client session.
///
/// `active_store_id` is `Some` exactly when `status` is `Binding` or
/// `Chatting`; `chat_history` is append-only except on reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub status: SessionStatus,
    pub active_store_id: Option<StoreId>,
    pub document_label: String,
    pub chat_history: Vec<Message>,
    /// At most four entries.
    pub example_questions: Vec<String>,
    pub pending_files: Vec<FileRef>,
    pub upload_progress: Option<UploadProgress>,
    /// Full-screen error text, shown while in `Error`.
    pub error_text: Option<String>,
    /// Inline message on the welcome screen (e.g. credential problems).
    pub notice: Option<String>,
    /// Inline message on the binding form.
    pub binding_error: Option<String>,
    /// Patient verified during binding.
    pub patient: Option<Patient>,
}
