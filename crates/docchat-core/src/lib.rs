//! Core value types for docchat.
//!
//! Defines the conversation turn and citation records, the append-only
//! transcript, the shared error type, and TOML configuration. All behavior
//! lives in the orchestration crates; this crate is data plus invariants.

pub mod config;
pub mod error;
pub mod transcript;
pub mod types;

pub use config::DocChatConfig;
pub use error::{CoreError, Result};
pub use transcript::Transcript;
pub use types::{Citation, Role, Turn};
