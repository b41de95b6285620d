//! Conversation message types
//!
//! Defines the turns sent to the completion API, the richer entries the
//! interactive session keeps for display, and the reply value returned by
//! the buffered request mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Ai,
}

impl ChatRole {
    /// Wire-level role string expected by the completion API
    pub fn as_api_role(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Ai => "assistant",
        }
    }
}

/// One prior turn handed to the API when building a request.
///
/// Immutable once constructed; the request builder only reads these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        ChatTurn {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        ChatTurn {
            role: ChatRole::Ai,
            content: content.into(),
        }
    }
}

/// Delivery state of a session entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Reply still streaming in
    Sending,
    /// Completed normally
    Sent,
    /// Stream or request failed; content holds the apology text
    Error,
}

/// A message as the interactive session records it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: EntryStatus,
}

impl ChatEntry {
    /// New user entry, already complete
    pub fn user(content: impl Into<String>) -> Self {
        ChatEntry {
            id: Uuid::new_v4(),
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            status: EntryStatus::Sent,
        }
    }

    /// Empty assistant placeholder that fragments get appended to
    pub fn ai_placeholder() -> Self {
        ChatEntry {
            id: Uuid::new_v4(),
            role: ChatRole::Ai,
            content: String::new(),
            timestamp: Utc::now(),
            status: EntryStatus::Sending,
        }
    }

    /// Convert to the API-facing turn shape
    pub fn to_turn(&self) -> ChatTurn {
        ChatTurn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Terminal value of the buffered request mode.
///
/// Failure is data, not a propagated error: after the attempt bound is
/// reached the caller gets an empty text plus the failure message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiReply {
    pub text: String,
    pub error: Option<String>,
}

impl ApiReply {
    pub fn ok(text: impl Into<String>) -> Self {
        ApiReply {
            text: text.into(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ApiReply {
            text: String::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
