//! Gemini API wire types for file search stores and grounded generation.
//!
//! These mirror the REST JSON shapes (camelCase) and are converted into the
//! provider-agnostic types from `clinicbot-types` at the edge.

use serde::{Deserialize, Serialize};

use clinicbot_types::message::SourceChunk;
use clinicbot_types::rag::{Operation, QueryAnswer};

// --- File search stores ---

/// Body of `POST v1beta/fileSearchStores`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub display_name: String,
}

/// A file search store resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSearchStore {
    /// Resource name, e.g. `fileSearchStores/clinic-rag-abc123`.
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Metadata part of `uploadToFileSearchStore`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub display_name: String,
    pub mime_type: String,
}

// --- Long-running operations ---

#[derive(Debug, Clone, Deserialize)]
pub struct OperationResponse {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<StatusBody>,
}

/// `google.rpc.Status` as returned inside operations and error envelopes.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl StatusBody {
    /// Best human-readable description.
    pub fn describe(&self) -> String {
        match (&self.message, &self.status) {
            (Some(m), Some(s)) => format!("{s}: {m}"),
            (Some(m), None) => m.clone(),
            (None, Some(s)) => s.clone(),
            (None, None) => format!("error code {}", self.code.unwrap_or_default()),
        }
    }
}

impl From<OperationResponse> for Operation {
    fn from(op: OperationResponse) -> Self {
        Operation {
            name: op.name,
            done: op.done,
            error: op.error.map(|e| e.describe()),
        }
    }
}

/// Error envelope: `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorWrapper {
    pub error: StatusBody,
}

// --- generateContent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

impl GenerateContentRequest {
    /// Single-turn user prompt answered with retrieval from one store.
    pub fn grounded(store_name: &str, prompt: &str, system_instruction: Option<&str>) -> Self {
        Self {
            contents: vec![Content::text("user", prompt)],
            system_instruction: system_instruction
                .filter(|s| !s.trim().is_empty())
                .map(|s| Content::text("system", s)),
            tools: vec![Tool {
                file_search: FileSearchTool {
                    file_search_store_names: vec![store_name.to_string()],
                },
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub file_search: FileSearchTool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSearchTool {
    pub file_search_store_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ContentResponse>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub parts: Vec<PartResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartResponse {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    #[serde(default)]
    pub retrieved_context: Option<RetrievedContext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievedContext {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Answer text plus one source chunk per grounding chunk.
    pub fn into_answer(self) -> QueryAnswer {
        let answer_text = self.text();
        let source_chunks = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.grounding_metadata)
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .map(|chunk| SourceChunk {
                        retrieved_text: chunk.retrieved_context.and_then(|ctx| ctx.text),
                    })
                    .collect()
            })
            .unwrap_or_default();

        QueryAnswer {
            answer_text,
            source_chunks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grounded_request_serializes_file_search_tool() {
        let req = GenerateContentRequest::grounded(
            "fileSearchStores/abc",
            "幾點開門？",
            Some("Answer from documents only."),
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "幾點開門？"}]}],
                "systemInstruction": {"role": "system", "parts": [{"text": "Answer from documents only."}]},
                "tools": [{"fileSearch": {"fileSearchStoreNames": ["fileSearchStores/abc"]}}]
            })
        );
    }

    #[test]
    fn blank_system_instruction_is_omitted() {
        let req = GenerateContentRequest::grounded("fileSearchStores/abc", "hi", Some("  "));
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn response_parses_answer_and_grounding_chunks() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "門診時間為"}, {"text": "週一至週五。"}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"retrievedContext": {"title": "hours.pdf", "text": "週一至週五 09:00-17:00"}},
                        {"retrievedContext": {"title": "map.pdf"}},
                        {"web": {"uri": "https://example.org"}}
                    ]
                }
            }]
        });
        let resp: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let answer = resp.into_answer();

        assert_eq!(answer.answer_text, "門診時間為週一至週五。");
        assert_eq!(answer.source_chunks.len(), 3);
        assert_eq!(
            answer.source_chunks[0].retrieved_text.as_deref(),
            Some("週一至週五 09:00-17:00")
        );
        assert!(answer.source_chunks[1].retrieved_text.is_none());
    }

    #[test]
    fn empty_response_yields_empty_answer() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let answer = resp.into_answer();
        assert!(answer.answer_text.is_empty());
        assert!(answer.source_chunks.is_empty());
    }

    #[test]
    fn operation_error_is_described() {
        let op: OperationResponse = serde_json::from_value(json!({
            "name": "fileSearchStores/abc/upload/operations/op1",
            "done": true,
            "error": {"code": 3, "message": "Unsupported MIME type", "status": "INVALID_ARGUMENT"}
        }))
        .unwrap();
        let op: Operation = op.into();
        assert!(op.done);
        assert_eq!(op.error.as_deref(), Some("INVALID_ARGUMENT: Unsupported MIME type"));
    }

    #[test]
    fn pending_operation_defaults_to_not_done() {
        let op: OperationResponse =
            serde_json::from_str(r#"{"name": "operations/op2"}"#).unwrap();
        let op: Operation = op.into();
        assert!(!op.done);
        assert!(op.error.is_none());
    }

    #[test]
    fn create_store_request_is_camel_case() {
        let value = serde_json::to_value(CreateStoreRequest {
            display_name: "clinic-rag-20250101-000000".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"displayName": "clinic-rag-20250101-000000"}));
    }
}
