//! BoxRagGateway -- object-safe dynamic dispatch wrapper for RagGateway.
//!
//! 1. Define an object-safe `RagGatewayDyn` trait with boxed futures
//! 2. Blanket-impl `RagGatewayDyn` for all `T: RagGateway`
//! 3. `BoxRagGateway` wraps `Box<dyn RagGatewayDyn>` and delegates
//!
//! `BoxRagGateway` itself implements `RagGateway`, so the orchestrator can
//! be instantiated once with a backend chosen at runtime.

use futures_util::future::BoxFuture;
use secrecy::SecretString;

use clinicbot_types::error::RagError;
use clinicbot_types::rag::{Operation, QueryAnswer, StoreId};
use clinicbot_types::session::FileRef;

use super::gateway::RagGateway;

/// Object-safe version of [`RagGateway`] with boxed futures.
pub trait RagGatewayDyn: Send + Sync {
    fn name(&self) -> &str;

    fn initialize(&self, api_key: SecretString) -> Result<(), RagError>;

    fn create_store_boxed<'a>(
        &'a self,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<StoreId, RagError>>;

    fn upload_document_boxed<'a>(
        &'a self,
        store: &'a StoreId,
        file: &'a FileRef,
    ) -> BoxFuture<'a, Result<Operation, RagError>>;

    fn poll_operation_boxed<'a>(
        &'a self,
        operation: &'a Operation,
    ) -> BoxFuture<'a, Result<Operation, RagError>>;

    fn query_boxed<'a>(
        &'a self,
        store: &'a StoreId,
        text: &'a str,
    ) -> BoxFuture<'a, Result<QueryAnswer, RagError>>;

    fn generate_suggested_questions_boxed<'a>(
        &'a self,
        store: &'a StoreId,
    ) -> BoxFuture<'a, Result<Vec<String>, RagError>>;

    fn delete_store_boxed<'a>(&'a self, store: &'a StoreId) -> BoxFuture<'a, Result<(), RagError>>;
}

/// Blanket implementation: any `RagGateway` automatically implements `RagGatewayDyn`.
impl<T: RagGateway> RagGatewayDyn for T {
    fn name(&self) -> &str {
        RagGateway::name(self)
    }

    fn initialize(&self, api_key: SecretString) -> Result<(), RagError> {
        RagGateway::initialize(self, api_key)
    }

    fn create_store_boxed<'a>(
        &'a self,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<StoreId, RagError>> {
        Box::pin(self.create_store(display_name))
    }

    fn upload_document_boxed<'a>(
        &'a self,
        store: &'a StoreId,
        file: &'a FileRef,
    ) -> BoxFuture<'a, Result<Operation, RagError>> {
        Box::pin(self.upload_document(store, file))
    }

    fn poll_operation_boxed<'a>(
        &'a self,
        operation: &'a Operation,
    ) -> BoxFuture<'a, Result<Operation, RagError>> {
        Box::pin(self.poll_operation(operation))
    }

    fn query_boxed<'a>(
        &'a self,
        store: &'a StoreId,
        text: &'a str,
    ) -> BoxFuture<'a, Result<QueryAnswer, RagError>> {
        Box::pin(self.query(store, text))
    }

    fn generate_suggested_questions_boxed<'a>(
        &'a self,
        store: &'a StoreId,
    ) -> BoxFuture<'a, Result<Vec<String>, RagError>> {
        Box::pin(self.generate_suggested_questions(store))
    }

    fn delete_store_boxed<'a>(&'a self, store: &'a StoreId) -> BoxFuture<'a, Result<(), RagError>> {
        Box::pin(self.delete_store(store))
    }
}

/// Type-erased RAG gateway for runtime backend selection.
pub struct BoxRagGateway {
    inner: Box<dyn RagGatewayDyn + Send + Sync>,
}

impl BoxRagGateway {
    /// Wrap a concrete `RagGateway` in a type-erased box.
    pub fn new<T: RagGateway + 'static>(gateway: T) -> Self {
        Self {
            inner: Box::new(gateway),
        }
    }
}

impl RagGateway for BoxRagGateway {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(&self, api_key: SecretString) -> Result<(), RagError> {
        self.inner.initialize(api_key)
    }

    async fn create_store(&self, display_name: &str) -> Result<StoreId, RagError> {
        self.inner.create_store_boxed(display_name).await
    }

    async fn upload_document(&self, store: &StoreId, file: &FileRef) -> Result<Operation, RagError> {
        self.inner.upload_document_boxed(store, file).await
    }

    async fn poll_operation(&self, operation: &Operation) -> Result<Operation, RagError> {
        self.inner.poll_operation_boxed(operation).await
    }

    async fn query(&self, store: &StoreId, text: &str) -> Result<QueryAnswer, RagError> {
        self.inner.query_boxed(store, text).await
    }

    async fn generate_suggested_questions(&self, store: &StoreId) -> Result<Vec<String>, RagError> {
        self.inner.generate_suggested_questions_boxed(store).await
    }

    async fn delete_store(&self, store: &StoreId) -> Result<(), RagError> {
        self.inner.delete_store_boxed(store).await
    }
}
