//! Conversation and message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ConversationId;

/// Author of one message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Typed by the user.
    User,
    /// Produced by the remote assistant.
    Assistant,
    /// Generated locally (errors, status).
    System,
}

impl MessageRole {
    /// The wire/storage spelling of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// One turn in a conversation. Immutable once created; ordering is
/// insertion order within its conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message body, raw markup as produced.
    pub content: String,
    /// Author role. Stored under the original `type` key.
    #[serde(rename = "type")]
    pub role: MessageRole,
    /// Creation time, serialized as ISO-8601.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self::at(role, content, Utc::now())
    }

    /// Create a message with an explicit timestamp (deterministic
    /// construction for embedders and tests).
    #[must_use]
    pub fn at(role: MessageRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            role,
            timestamp,
        }
    }
}

/// A titled, ordered sequence of messages identified by a unique id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique identifier within the store.
    pub id: ConversationId,
    /// Display title; defaults to [`Self::DEFAULT_TITLE`] until the title
    /// rule fires.
    pub title: String,
    /// Append-only message sequence in production order.
    pub messages: Vec<Message>,
    /// Fixed at first creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every append.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Sentinel title of a conversation that has not been named yet.
    pub const DEFAULT_TITLE: &'static str = "New Conversation";

    /// Explicit factory for the lazy-default record: a fresh, empty,
    /// sentinel-titled conversation. Never inserted into the store by
    /// construction alone.
    #[must_use]
    pub fn draft(id: ConversationId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: Self::DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append one message and refresh `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.updated_at = message.timestamp;
        self.messages.push(message);
    }

    /// Whether the title is still the sentinel default.
    #[must_use]
    pub fn has_default_title(&self) -> bool {
        self.title == Self::DEFAULT_TITLE
    }

    /// First user-authored message, if any.
    #[must_use]
    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == MessageRole::User)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let message = Message::new(MessageRole::Assistant, "hi");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "assistant");
        assert_eq!(value["content"], "hi");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_conversation_wire_shape_is_camel_case() {
        let conversation = Conversation::draft(ConversationId::new());
        let value = serde_json::to_value(&conversation).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["title"], Conversation::DEFAULT_TITLE);
    }

    #[test]
    fn test_push_refreshes_updated_at() {
        let mut conversation = Conversation::draft(ConversationId::new());
        let created = conversation.created_at;
        let later = created + chrono::Duration::seconds(5);
        conversation.push(Message::at(MessageRole::User, "hello", later));
        assert_eq!(conversation.updated_at, later);
        assert_eq!(conversation.created_at, created);
    }

    #[test]
    fn test_first_user_message_skips_seed() {
        let mut conversation = Conversation::draft(ConversationId::new());
        conversation.push(Message::new(MessageRole::Assistant, "welcome"));
        conversation.push(Message::new(MessageRole::User, "question"));
        let first = conversation.first_user_message().unwrap();
        assert_eq!(first.content, "question");
    }
}
