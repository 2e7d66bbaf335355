//! Events published by the session orchestrator.

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::session::{SessionStatus, UploadProgress};

/// Observable session changes, for front-ends that render asynchronously.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session moved between lifecycle states.
    StatusChanged {
        from: SessionStatus,
        to: SessionStatus,
    },

    /// A provisioning step started (replaces the previous snapshot).
    Progress(UploadProgress),

    /// A message was appended to the chat history.
    MessageAppended(Message),
}
