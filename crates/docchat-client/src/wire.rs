//! Wire types for the two service endpoints.

use serde::{Deserialize, Serialize};

/// Request body for the ask endpoint.
#[derive(Debug, Serialize)]
pub struct AskRequest<'a> {
    pub doc_id: &'a str,
    pub question: &'a str,
}

/// Success body of the upload endpoint.
///
/// `doc_id` is mandatory; a success response without it is malformed.
/// `chunks` is informational and may be absent.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub doc_id: String,
    #[serde(default)]
    pub chunks: Option<u64>,
}

/// Success body of the ask endpoint. Both fields are optional on the wire;
/// the orchestrator substitutes a placeholder answer and empty sources.
#[derive(Debug, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

/// One cited source in an ask response.
#[derive(Debug, Deserialize)]
pub struct SourceRef {
    pub page: u32,
    pub snippet: String,
}

/// Failure body of either endpoint. Both fields are optional; a non-JSON
/// failure body decodes to the default (both `None`).
#[derive(Debug, Default, Deserialize)]
pub struct FailureBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}
