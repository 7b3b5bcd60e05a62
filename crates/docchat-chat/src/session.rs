//! Document session lifecycle and the shared session context.
//!
//! [`DocumentSession`] is the single source of truth for "is the document
//! ready". [`SessionContext`] bundles it with the transcript and the ask
//! exclusivity flag; one context corresponds to one document, and a
//! re-upload starts a fresh context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use docchat_core::Transcript;

use crate::error::{ChatError, Result};

/// Upload lifecycle state of the session's document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Uploading,
    Ready,
    Failed,
}

/// Holds the opaque document identifier and its upload lifecycle state.
///
/// Invariant: the identifier is present exactly when the status is `Ready`.
/// Transitions are `Idle -> Uploading -> {Ready | Failed}` and
/// `Failed -> Uploading` (retry). There is no transition out of `Ready`.
/// Pure state machine; performs no I/O.
#[derive(Debug)]
pub struct DocumentSession {
    identifier: Option<String>,
    status: SessionStatus,
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSession {
    /// Fresh session with no document.
    pub fn new() -> Self {
        Self {
            identifier: None,
            status: SessionStatus::Idle,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The identifier issued by the service; `Some` iff the status is Ready.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }

    /// Enter the `Uploading` state.
    ///
    /// Rejects a duplicate concurrent upload with [`ChatError::UploadConflict`]
    /// and an upload over a ready document with
    /// [`ChatError::DocumentAlreadyReady`].
    pub fn begin_upload(&mut self) -> Result<()> {
        match self.status {
            SessionStatus::Idle | SessionStatus::Failed => {
                self.status = SessionStatus::Uploading;
                Ok(())
            }
            SessionStatus::Uploading => Err(ChatError::UploadConflict),
            SessionStatus::Ready => Err(ChatError::DocumentAlreadyReady),
        }
    }

    /// Record a successful upload: store the identifier, become `Ready`.
    pub fn complete_upload(&mut self, identifier: String) -> Result<()> {
        if self.status != SessionStatus::Uploading {
            return Err(ChatError::Internal(
                "upload completion outside an active upload".to_string(),
            ));
        }
        self.identifier = Some(identifier);
        self.status = SessionStatus::Ready;
        Ok(())
    }

    /// Record a failed upload: clear the identifier, become `Failed`.
    /// A subsequent `begin_upload` retries from here.
    pub fn fail_upload(&mut self) -> Result<()> {
        if self.status != SessionStatus::Uploading {
            return Err(ChatError::Internal(
                "upload failure outside an active upload".to_string(),
            ));
        }
        self.identifier = None;
        self.status = SessionStatus::Failed;
        Ok(())
    }
}

/// Shared mutable state for one chat session.
///
/// The orchestrators are the only writers. Locks are scoped and never held
/// across an await; the `asking` flag is the sole ordering guarantee between
/// operations (no second ask until the first resolves).
pub struct SessionContext {
    document: Mutex<DocumentSession>,
    transcript: Mutex<Transcript>,
    asking: AtomicBool,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    /// Fresh context: idle session, empty transcript, no ask in flight.
    pub fn new() -> Self {
        Self {
            document: Mutex::new(DocumentSession::new()),
            transcript: Mutex::new(Transcript::new()),
            asking: AtomicBool::new(false),
        }
    }

    /// Current lifecycle status. A poisoned lock reads as `Failed`.
    pub fn status(&self) -> SessionStatus {
        self.document
            .lock()
            .map(|d| d.status())
            .unwrap_or(SessionStatus::Failed)
    }

    pub fn is_ready(&self) -> bool {
        self.status() == SessionStatus::Ready
    }

    /// The document identifier, for display alongside the conversation.
    pub fn document_id(&self) -> Option<String> {
        self.document
            .lock()
            .ok()
            .and_then(|d| d.identifier().map(str::to_owned))
    }

    /// Whether an ask is currently in flight.
    pub fn is_asking(&self) -> bool {
        self.asking.load(Ordering::Acquire)
    }

    /// Snapshot of the transcript for rendering.
    pub fn transcript(&self) -> Transcript {
        self.transcript
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    pub fn transcript_is_empty(&self) -> bool {
        self.transcript.lock().map(|t| t.is_empty()).unwrap_or(true)
    }

    pub(crate) fn document(&self) -> Result<MutexGuard<'_, DocumentSession>> {
        self.document
            .lock()
            .map_err(|e| ChatError::Internal(format!("session lock poisoned: {}", e)))
    }

    pub(crate) fn transcript_mut(&self) -> Result<MutexGuard<'_, Transcript>> {
        self.transcript
            .lock()
            .map_err(|e| ChatError::Internal(format!("transcript lock poisoned: {}", e)))
    }

    pub(crate) fn asking_flag(&self) -> &AtomicBool {
        &self.asking
    }
}
