//! Session state machine and request orchestration for docchat.
//!
//! Sequences the two-phase workflow: upload a document to obtain an opaque
//! identifier, then ask questions against it. Owns the preconditions, the
//! concurrent-request safety, and the append-only transcript; the external
//! service and the presentation layer are collaborators.

pub mod ask;
pub mod error;
pub mod notify;
pub mod session;
pub mod upload;

pub use ask::{AskOutcome, QueryOrchestrator, FAILURE_MARKER, NO_ANSWER_PLACEHOLDER};
pub use error::{ChatError, Result};
pub use notify::{Notifier, TracingNotifier};
pub use session::{DocumentSession, SessionContext, SessionStatus};
pub use upload::UploadOrchestrator;
