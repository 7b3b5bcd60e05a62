//! The document-service abstraction the orchestrators call.

use std::path::Path;

use async_trait::async_trait;
use docchat_core::Citation;

use crate::error::ServiceError;

/// Result of a successful document upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Opaque handle the service issued for the ingested document.
    pub identifier: String,
    /// How many chunks the service stored, when it reports that.
    pub chunk_count: Option<u64>,
}

/// Result of a successful ask call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Answer text; `None` when the service omitted it.
    pub text: Option<String>,
    /// Supporting citations, already converted to core records.
    pub citations: Vec<Citation>,
}

/// The external document-processing service, reduced to its two operations.
///
/// Implementations perform exactly one call per invocation and do not retry;
/// retry is a user-initiated re-invocation at the orchestrator level.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Submit a document and obtain its opaque identifier.
    async fn upload(&self, file: &Path) -> Result<UploadReceipt, ServiceError>;

    /// Ask a question against a previously uploaded document.
    async fn ask(&self, doc_id: &str, question: &str) -> Result<Answer, ServiceError>;
}
