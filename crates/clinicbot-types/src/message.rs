//! Chat message and grounding evidence types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Model => write!(f, "model"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "model" => Ok(MessageRole::Model),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A snippet of retrieved document text returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceChunk {
    pub retrieved_text: Option<String>,
}

/// A single entry of the chat history. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub text: String,
    /// Grounding evidence (model messages only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_chunks: Vec<SourceChunk>,
    /// Fixed crisis-support content that bypasses the markup renderer.
    #[serde(default)]
    pub is_crisis: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: MessageRole, text: String, source_chunks: Vec<SourceChunk>, is_crisis: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            text,
            source_chunks,
            is_crisis,
            created_at: Utc::now(),
        }
    }

    /// A message typed by the patient.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text.into(), Vec::new(), false)
    }

    /// A model answer with its grounding chunks.
    pub fn model(text: impl Into<String>, source_chunks: Vec<SourceChunk>) -> Self {
        Self::new(MessageRole::Model, text.into(), source_chunks, false)
    }

    /// The fixed crisis-support reply.
    pub fn crisis(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Model, text.into(), Vec::new(), true)
    }
}
