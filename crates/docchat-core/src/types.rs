//! Conversation value records.
//!
//! A [`Turn`] is one message in the conversation, authored by the user or
//! the assistant. Turns are created once and never mutated; the transcript
//! owns them in insertion order.

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A pointer into the source document supporting an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based page number in the source document.
    pub page: u32,
    /// Excerpt from that page backing the answer.
    pub snippet: String,
}

/// One immutable message in the conversation.
///
/// User turns carry the (already trimmed, non-empty) question text and no
/// citations. Assistant turns carry the answer text, which may be a
/// placeholder when the service returned no answer, plus zero or more
/// citations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub citations: Vec<Citation>,
    /// Creation time as epoch seconds.
    pub created_at: i64,
}

impl Turn {
    /// Create a user turn. Citations are always empty for user turns.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            text: text.into(),
            citations: Vec::new(),
            created_at: Local::now().timestamp(),
        }
    }

    /// Create an assistant turn with its supporting citations.
    pub fn assistant(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            text: text.into(),
            citations,
            created_at: Local::now().timestamp(),
        }
    }
}
