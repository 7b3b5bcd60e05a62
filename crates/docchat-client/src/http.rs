//! reqwest-based implementation of [`DocumentService`].

use std::path::Path;

use async_trait::async_trait;
use docchat_core::config::ServerConfig;
use docchat_core::Citation;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};

use crate::error::ServiceError;
use crate::service::{Answer, DocumentService, UploadReceipt};
use crate::wire::{AskRequest, AskResponse, FailureBody, UploadResponse};

/// HTTP client for the document service.
///
/// No request timeout is configured: a call runs until the service answers
/// or the connection drops, matching the no-cancellation model upstream.
pub struct HttpDocumentService {
    client: Client,
    upload_url: String,
    ask_url: String,
}

impl HttpDocumentService {
    /// Build a client against the configured endpoints.
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            client: Client::new(),
            upload_url: join_url(&config.base_url, &config.upload_path),
            ask_url: join_url(&config.base_url, &config.ask_path),
        }
    }

    /// Turn a non-2xx response into a [`ServiceError::Server`], decoding the
    /// optional structured failure body. A body that is not JSON yields a
    /// server error with neither field set.
    async fn server_error(response: Response) -> ServiceError {
        let status = response.status().as_u16();
        let body: FailureBody = response.json().await.unwrap_or_default();
        ServiceError::Server {
            status,
            error: body.error,
            detail: body.detail,
        }
    }
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn upload(&self, file: &Path) -> Result<UploadReceipt, ServiceError> {
        let bytes = tokio::fs::read(file).await.map_err(|e| {
            ServiceError::Transport(format!("failed to read {}: {}", file.display(), e))
        })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        tracing::debug!(url = %self.upload_url, "POST upload");
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(ServiceError::transport)?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(UploadReceipt {
            identifier: body.doc_id,
            chunk_count: body.chunks,
        })
    }

    async fn ask(&self, doc_id: &str, question: &str) -> Result<Answer, ServiceError> {
        tracing::debug!(url = %self.ask_url, doc_id = %doc_id, "POST ask");
        let response = self
            .client
            .post(&self.ask_url)
            .json(&AskRequest { doc_id, question })
            .send()
            .await
            .map_err(ServiceError::transport)?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let body: AskResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(Answer {
            text: body.answer,
            citations: body
                .sources
                .into_iter()
                .map(|s| Citation {
                    page: s.page,
                    snippet: s.snippet,
                })
                .collect(),
        })
    }
}

/// Join a base URL and an endpoint path without doubling slashes.
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
