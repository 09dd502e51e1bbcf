//! Turn domain types.
//!
//! A turn is one role-tagged entry of the transcript:
//! the controller writes system/user turns → the model answers with an
//! assistant turn → tool results come back as observation turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a turn in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (tool catalogue, protocol rules)
    System,
    /// The goal supplied by the caller
    User,
    /// Text generated by the model
    Assistant,
    /// Result of a tool invocation fed back to the model
    Observation,
}

impl Role {
    /// The role name used on the wire when talking to a chat-completion API.
    ///
    /// Chat APIs have no observation role; observations are replayed as
    /// assistant messages.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant | Role::Observation => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Observation => "observation",
        };
        f.write_str(name)
    }
}

/// A single turn in a transcript.
///
/// Turns are immutable once appended; the store assigns `sequence` on
/// `add`, and that position is the only notion of recency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Position in the transcript (assigned by the store)
    #[serde(default)]
    pub sequence: u64,

    /// Who produced this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// When the turn was created
    pub timestamp: DateTime<Utc>,

    /// Free-form metadata (`step`, `tool`, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Turn {
    /// Create a turn with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Create a new system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new observation turn.
    pub fn observation(content: impl Into<String>) -> Self {
        Self::new(Role::Observation, content)
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
