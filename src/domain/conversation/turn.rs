//! Conversation turns kept in the message log.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// A single exchange entry.
///
/// The log stores turns as serialized strings so the history format stays
/// opaque to everything except the code that rebuilds generation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    /// Serialized form stored in the message log.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.content.clone())
    }

    /// Reads a log entry back. Entries that are not encoded turns are
    /// treated as assistant text.
    pub fn decode(entry: &str) -> Self {
        serde_json::from_str(entry).unwrap_or_else(|_| Self::assistant(entry))
    }
}
