use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Extra;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    /// Wire labels accepted for a message sender.
    pub const LABELS: &'static [&'static str] = &["user", "ai"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message inside a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, content: impl Into<String>, sender: Sender, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            sender,
            timestamp,
            extra: Extra::new(),
        }
    }
}

/// A persisted chat conversation.
///
/// `owner_id` is optional because conversations migrated from the flat
/// message list predate owner partitioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Caller-supplied fields of a new conversation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConversationDraft {
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Partial update of a conversation; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPatch {
    pub title: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub updated_at: Option<i64>,
}

impl Conversation {
    pub fn apply(&mut self, patch: ConversationPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(messages) = patch.messages {
            self.messages = messages;
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = updated_at;
        }
    }
}
