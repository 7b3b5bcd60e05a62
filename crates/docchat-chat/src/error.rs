//! Error types for the orchestration layer.

/// Errors from the chat orchestrators.
///
/// The first four variants are detected synchronously and never reach the
/// network layer. `UploadFailed` carries a message already normalized for
/// display.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Upload triggered without a file (validation).
    #[error("no file selected")]
    NoFileSelected,
    /// An upload is already in flight (conflict).
    #[error("an upload is already in progress")]
    UploadConflict,
    /// Upload attempted on a session that already holds a document; a
    /// re-upload starts a fresh session instead.
    #[error("document already uploaded; start a new session to replace it")]
    DocumentAlreadyReady,
    /// Ask attempted before the document is ready (precondition).
    #[error("document not ready")]
    DocumentNotReady,
    /// The external upload call failed; the message is the normalized,
    /// user-facing explanation.
    #[error("{0}")]
    UploadFailed(String),
    /// Broken internal state, e.g. a poisoned session lock.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized `Result` type for orchestration operations.
pub type Result<T> = std::result::Result<T, ChatError>;
