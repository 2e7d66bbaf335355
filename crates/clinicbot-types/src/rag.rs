//! Request/response shapes of the remote RAG gateway.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::message::SourceChunk;

/// Remote identifier of a RAG store (e.g. `fileSearchStores/abc123`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub String);

impl StoreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreId(\"{}\")", self.0)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a long-running remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    /// Failure message reported by the remote side once `done`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Operation {
    /// A handle that is already complete (used by backends that finish
    /// uploads synchronously).
    pub fn completed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            error: None,
        }
    }
}

/// A grounded answer from the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer_text: String,
    pub source_chunks: Vec<SourceChunk>,
}
