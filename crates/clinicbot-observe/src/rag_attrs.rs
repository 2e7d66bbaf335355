//! Span attribute names for remote retrieval (file search) calls.
//!
//! Every gateway call opens a span named [`SPAN_NAME`] carrying
//! [`RAG_OPERATION`] plus whichever of the other fields apply.

/// Name of the span wrapping one gateway call.
pub const SPAN_NAME: &str = "rag.call";

// --- Attributes ---

/// The gateway operation (one of the `OP_*` values below).
pub const RAG_OPERATION: &str = "rag.operation";

/// Backend name (e.g. "gemini").
pub const RAG_PROVIDER: &str = "rag.provider";

/// Model used for generation calls.
pub const RAG_MODEL: &str = "rag.model";

/// Remote store identifier.
pub const RAG_STORE_ID: &str = "rag.store_id";

/// Long-running operation name.
pub const RAG_OPERATION_ID: &str = "rag.operation_id";

/// Number of grounding chunks returned with an answer.
pub const RAG_CHUNK_COUNT: &str = "rag.chunk_count";

// --- Operation values ---

pub const OP_CREATE_STORE: &str = "create_store";
pub const OP_UPLOAD_DOCUMENT: &str = "upload_document";
pub const OP_POLL_OPERATION: &str = "poll_operation";
pub const OP_QUERY: &str = "query";
pub const OP_GENERATE_QUESTIONS: &str = "generate_questions";
pub const OP_DELETE_STORE: &str = "delete_store";

// --- Provider values ---

pub const PROVIDER_GEMINI: &str = "gemini";

/// All operation values, in provisioning order.
pub const ALL_OPERATIONS: &[&str] = &[
    OP_CREATE_STORE,
    OP_UPLOAD_DOCUMENT,
    OP_POLL_OPERATION,
    OP_GENERATE_QUESTIONS,
    OP_QUERY,
    OP_DELETE_STORE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_are_unique_snake_case() {
        let mut seen = std::collections::HashSet::new();
        for op in ALL_OPERATIONS {
            assert!(seen.insert(*op), "duplicate operation {op}");
            assert!(op.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn attributes_share_prefix() {
        for attr in [RAG_OPERATION, RAG_PROVIDER, RAG_MODEL, RAG_STORE_ID, RAG_OPERATION_ID, RAG_CHUNK_COUNT] {
            assert!(attr.starts_with("rag."));
        }
    }
}
