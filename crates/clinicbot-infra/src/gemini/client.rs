//! GeminiGateway -- concrete [`RagGateway`] over the Gemini File Search API.
//!
//! Stores are `fileSearchStores/*` resources; documents are ingested with
//! `uploadToFileSearchStore` (a long-running operation); answers come from
//! `generateContent` with the `fileSearch` tool scoped to a single store.
//!
//! The API key is held as a [`SecretString`] and only exposed when building
//! the `x-goog-api-key` header.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, info_span};

use clinicbot_core::rag::gateway::RagGateway;
use clinicbot_core::rag::questions::parse_suggested_questions;
use clinicbot_observe::rag_attrs;
use clinicbot_types::config::{ClinicConfig, Locale};
use clinicbot_types::error::{RagError, is_invalid_credential_message};
use clinicbot_types::rag::{Operation, QueryAnswer, StoreId};
use clinicbot_types::session::FileRef;

use super::types::{
    CreateStoreRequest, ErrorWrapper, FileSearchStore, GenerateContentRequest,
    GenerateContentResponse, OperationResponse, UploadMetadata,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const MULTIPART_BOUNDARY: &str = "clinicbot-upload-boundary";

/// Gemini File Search gateway.
///
/// Created unauthenticated; [`RagGateway::initialize`] installs the key.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: RwLock<Option<Arc<SecretString>>>,
    base_url: String,
    model: String,
    system_instruction: String,
    locale: Locale,
}

impl GeminiGateway {
    /// Build a gateway from configuration.
    pub fn new(config: &ClinicConfig) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RagError::Remote(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: RwLock::new(None),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            system_instruction: config.system_instruction.clone(),
            locale: config.locale,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn key(&self) -> Result<Arc<SecretString>, RagError> {
        let guard = self
            .api_key
            .read()
            .map_err(|_| RagError::Remote("credential lock poisoned".to_string()))?;
        guard.clone().ok_or(RagError::NotInitialized)
    }

    /// Send an authenticated request and decode the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, RagError> {
        let key = self.key()?;
        let response = request
            .header(API_KEY_HEADER, key.expose_secret())
            .send()
            .await
            .map_err(|e| RagError::Remote(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RagError::Parse(format!("failed to parse response: {e}")))
    }

    async fn generate(&self, store: &StoreId, prompt: &str) -> Result<GenerateContentResponse, RagError> {
        let body = GenerateContentRequest::grounded(
            store.as_str(),
            prompt,
            Some(self.system_instruction.as_str()),
        );
        let url = self.url(&format!("v1beta/models/{}:generateContent", self.model));
        self.send(self.client.post(url).json(&body)).await
    }
}

// GeminiGateway does not derive Debug so the key holder never shows up in logs.

impl RagGateway for GeminiGateway {
    fn name(&self) -> &str {
        rag_attrs::PROVIDER_GEMINI
    }

    fn initialize(&self, api_key: SecretString) -> Result<(), RagError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(RagError::InvalidCredential("empty API key".to_string()));
        }
        let mut guard = self
            .api_key
            .write()
            .map_err(|_| RagError::Remote("credential lock poisoned".to_string()))?;
        *guard = Some(Arc::new(api_key));
        Ok(())
    }

    async fn create_store(&self, display_name: &str) -> Result<StoreId, RagError> {
        let span = info_span!(
            "rag.call",
            rag.operation = rag_attrs::OP_CREATE_STORE,
            rag.provider = rag_attrs::PROVIDER_GEMINI,
        );
        async {
            let body = CreateStoreRequest {
                display_name: display_name.to_string(),
            };
            let store: FileSearchStore = self
                .send(self.client.post(self.url("v1beta/fileSearchStores")).json(&body))
                .await?;
            debug!(store_id = %store.name, "File search store created");
            Ok(StoreId::new(store.name))
        }
        .instrument(span)
        .await
    }

    async fn upload_document(&self, store: &StoreId, file: &FileRef) -> Result<Operation, RagError> {
        let span = info_span!(
            "rag.call",
            rag.operation = rag_attrs::OP_UPLOAD_DOCUMENT,
            rag.provider = rag_attrs::PROVIDER_GEMINI,
            rag.store_id = %store,
            file = %file.name,
        );
        async {
            let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
                RagError::Remote(format!("failed to read {}: {e}", file.path.display()))
            })?;
            let metadata = UploadMetadata {
                display_name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            };
            let metadata = serde_json::to_string(&metadata)
                .map_err(|e| RagError::Parse(format!("failed to encode upload metadata: {e}")))?;
            let body = multipart_related(MULTIPART_BOUNDARY, &metadata, &file.mime_type, &bytes);

            let url = self.url(&format!("upload/v1beta/{store}:uploadToFileSearchStore"));
            let request = self
                .client
                .post(url)
                .header("X-Goog-Upload-Protocol", "multipart")
                .header(
                    reqwest::header::CONTENT_TYPE,
                    format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(body);
            let op: OperationResponse = self.send(request).await?;
            debug!(operation = %op.name, done = op.done, "Upload accepted");
            Ok(op.into())
        }
        .instrument(span)
        .await
    }

    async fn poll_operation(&self, operation: &Operation) -> Result<Operation, RagError> {
        let span = info_span!(
            "rag.call",
            rag.operation = rag_attrs::OP_POLL_OPERATION,
            rag.provider = rag_attrs::PROVIDER_GEMINI,
            rag.operation_id = %operation.name,
        );
        async {
            let url = self.url(&format!("v1beta/{}", operation.name));
            let op: OperationResponse = self.send(self.client.get(url)).await?;
            Ok(op.into())
        }
        .instrument(span)
        .await
    }

    async fn query(&self, store: &StoreId, text: &str) -> Result<QueryAnswer, RagError> {
        let span = info_span!(
            "rag.call",
            rag.operation = rag_attrs::OP_QUERY,
            rag.provider = rag_attrs::PROVIDER_GEMINI,
            rag.model = %self.model,
            rag.store_id = %store,
            rag.chunk_count = tracing::field::Empty,
        );
        async {
            let answer = self.generate(store, text).await?.into_answer();
            tracing::Span::current().record("rag.chunk_count", answer.source_chunks.len());
            Ok(answer)
        }
        .instrument(span)
        .await
    }

    async fn generate_suggested_questions(&self, store: &StoreId) -> Result<Vec<String>, RagError> {
        let span = info_span!(
            "rag.call",
            rag.operation = rag_attrs::OP_GENERATE_QUESTIONS,
            rag.provider = rag_attrs::PROVIDER_GEMINI,
            rag.model = %self.model,
            rag.store_id = %store,
        );
        async {
            let response = self.generate(store, question_prompt(self.locale)).await?;
            parse_suggested_questions(&response.text())
        }
        .instrument(span)
        .await
    }

    async fn delete_store(&self, store: &StoreId) -> Result<(), RagError> {
        let span = info_span!(
            "rag.call",
            rag.operation = rag_attrs::OP_DELETE_STORE,
            rag.provider = rag_attrs::PROVIDER_GEMINI,
            rag.store_id = %store,
        );
        async {
            let url = self.url(&format!("v1beta/{store}?force=true"));
            match self.send::<serde_json::Value>(self.client.delete(url)).await {
                Ok(_) => Ok(()),
                // Already gone counts as deleted.
                Err(RagError::Remote(msg) | RagError::InvalidCredential(msg))
                    if msg.starts_with("HTTP 404") =>
                {
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        .instrument(span)
        .await
    }
}

/// Prompt asking for example questions as a bare JSON array.
fn question_prompt(locale: Locale) -> &'static str {
    match locale {
        Locale::ZhTw => {
            "請根據知識庫中的文件，列出病患最可能詢問的 4 個問題。\
             只輸出 JSON 字串陣列，例如 [\"問題一\", \"問題二\"]，不要加入其他文字。\
             若知識庫沒有文件，請提供一般診所常見問題。請使用繁體中文。"
        }
        Locale::En => {
            "Based on the documents in the knowledge base, list the 4 questions a patient \
             is most likely to ask. Output only a JSON array of strings, for example \
             [\"Question one\", \"Question two\"], with no other text. If there are no \
             documents, suggest common general clinic questions."
        }
    }
}

/// Map a non-success HTTP response to a [`RagError`].
///
/// 401/403 and bodies carrying invalid-key markers become
/// [`RagError::InvalidCredential`]; everything else is [`RagError::Remote`]
/// prefixed with the status.
pub(crate) fn map_http_error(status: StatusCode, body: &str) -> RagError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|w| w.error.describe())
        .unwrap_or_else(|_| body.trim().to_string());

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || is_invalid_credential_message(&message)
    {
        return RagError::InvalidCredential(format!("HTTP {}: {message}", status.as_u16()));
    }
    RagError::Remote(format!("HTTP {}: {message}", status.as_u16()))
}

/// Encode a two-part `multipart/related` body: JSON metadata, then the file.
pub(crate) fn multipart_related(boundary: &str, metadata_json: &str, mime_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + metadata_json.len() + 256);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(metadata_json.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
