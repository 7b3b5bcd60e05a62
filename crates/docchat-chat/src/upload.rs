//! Upload orchestrator: drives the document session through its lifecycle.

use std::path::Path;
use std::sync::Arc;

use docchat_client::{normalize, DocumentService, UploadReceipt};

use crate::error::{ChatError, Result};
use crate::notify::Notifier;
use crate::session::SessionContext;

/// Generic fallback when an upload failure carries no message at all.
const UPLOAD_FALLBACK: &str = "Upload failed";

/// Sequences one upload exchange with the external service.
///
/// Exactly one external call per invocation; no internal retry. A failed
/// upload leaves the session in `Failed`, from which the user may invoke
/// again.
pub struct UploadOrchestrator {
    service: Arc<dyn DocumentService>,
    notifier: Arc<dyn Notifier>,
}

impl UploadOrchestrator {
    pub fn new(service: Arc<dyn DocumentService>, notifier: Arc<dyn Notifier>) -> Self {
        Self { service, notifier }
    }

    /// Upload a document and record its identifier in the session.
    ///
    /// The missing-file check happens before any state transition or I/O.
    /// On success the session becomes `Ready` and the receipt is returned
    /// for display; on failure the session becomes `Failed` and the error
    /// carries the normalized message, which is also sent to the notifier.
    pub async fn upload(
        &self,
        ctx: &SessionContext,
        file: Option<&Path>,
    ) -> Result<UploadReceipt> {
        let Some(path) = file else {
            return Err(ChatError::NoFileSelected);
        };

        ctx.document()?.begin_upload()?;
        tracing::info!(file = %path.display(), "Uploading document");

        match self.service.upload(path).await {
            Ok(receipt) => {
                ctx.document()?.complete_upload(receipt.identifier.clone())?;
                tracing::info!(
                    doc_id = %receipt.identifier,
                    chunks = ?receipt.chunk_count,
                    "Document ready"
                );
                self.notifier.notify(&format!(
                    "Document uploaded! doc_id: {}, chunks stored: {}",
                    receipt.identifier,
                    chunks_display(receipt.chunk_count)
                ));
                Ok(receipt)
            }
            Err(failure) => {
                ctx.document()?.fail_upload()?;
                let message = normalize(&failure, UPLOAD_FALLBACK);
                tracing::warn!(error = %failure, "Upload failed");
                self.notifier.notify(&message);
                Err(ChatError::UploadFailed(message))
            }
        }
    }
}

/// Chunk count for display; the service may not report one.
fn chunks_display(chunks: Option<u64>) -> String {
    match chunks {
        Some(n) => n.to_string(),
        None => "N/A".to_string(),
    }
}
