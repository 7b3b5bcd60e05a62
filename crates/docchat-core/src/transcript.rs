//! Append-only conversation transcript.

use serde::{Deserialize, Serialize};

use crate::types::Turn;

/// Ordered log of conversation turns.
///
/// Insertion order is chronological order is display order. Turns are never
/// removed or altered once appended; failed asks stay visible so the user
/// can diagnose what happened.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end of the log.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Whether no turns have been appended yet.
    ///
    /// The presentation layer shows a placeholder prompt while this holds.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of turns appended so far.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// All turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recently appended turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
