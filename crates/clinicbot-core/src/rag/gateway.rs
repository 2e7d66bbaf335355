//! RagGateway trait definition.
//!
//! The managed retrieval service (store creation, ingestion, grounded
//! answering) is opaque to this crate. Backends implement this trait in
//! `clinicbot-infra`.

use secrecy::SecretString;

use clinicbot_types::error::RagError;
use clinicbot_types::rag::{Operation, QueryAnswer, StoreId};
use clinicbot_types::session::FileRef;

/// Trait for remote RAG backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait RagGateway: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Establish the credential used by all subsequent calls.
    ///
    /// Calls made before this return [`RagError::NotInitialized`].
    fn initialize(&self, api_key: SecretString) -> Result<(), RagError>;

    /// Create an empty store and return its identifier.
    fn create_store(
        &self,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<StoreId, RagError>> + Send;

    /// Start ingesting one document into a store.
    ///
    /// The returned operation must be polled until `done`.
    fn upload_document(
        &self,
        store: &StoreId,
        file: &FileRef,
    ) -> impl std::future::Future<Output = Result<Operation, RagError>> + Send;

    /// Re-read the status of a long-running operation.
    fn poll_operation(
        &self,
        operation: &Operation,
    ) -> impl std::future::Future<Output = Result<Operation, RagError>> + Send;

    /// Answer a question using retrieval scoped to `store` only.
    fn query(
        &self,
        store: &StoreId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<QueryAnswer, RagError>> + Send;

    /// Ask the backend for up to four example questions about the store.
    ///
    /// A malformed payload is reported as [`RagError::Parse`].
    fn generate_suggested_questions(
        &self,
        store: &StoreId,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RagError>> + Send;

    /// Delete a store and its documents.
    fn delete_store(
        &self,
        store: &StoreId,
    ) -> impl std::future::Future<Output = Result<(), RagError>> + Send;
}
