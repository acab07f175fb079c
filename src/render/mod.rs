//! Pure projections of conversation state into display models.
//!
//! The rendering surface (page, terminal, anything else) consumes these
//! models; no presentation object ever reaches back into session logic.

use serde::Serialize;

use crate::conversation::{Conversation, ConversationId, Message, MessageRole};
use crate::format::TextFormatter;

/// Fixed block shown when a transcript has zero messages. This is a view,
/// not a stored message, distinct from the seeded welcome of a newly
/// started conversation.
pub const EMPTY_STATE_BODY: &str = "<p>Hello! I'm NexusAI, your intelligent travel assistant. \
     I can help you with:</p><ul><li>Flight cancellations and modifications</li>\
     <li>Travel policy information</li><li>Flight status updates</li>\
     <li>Seat availability</li><li>Pet travel policies</li></ul>\
     <p>How can I assist you today?</p>";

/// Run of consecutive messages sharing one author role.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MessageGroup {
    /// Author of every message in the group.
    pub role: MessageRole,
    /// Formatted message bodies in production order.
    pub bodies: Vec<String>,
}

/// Display model of one conversation's transcript.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TranscriptView {
    /// Zero-message empty state.
    Empty {
        /// Fixed welcome block body.
        body: String,
    },
    /// Messages clustered into visual groups, chronological order.
    Conversation {
        /// Consecutive same-role runs.
        groups: Vec<MessageGroup>,
    },
}

/// One entry of the conversation list pane.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConversationListEntry {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Display title.
    pub title: String,
    /// Whether this entry is the active conversation.
    pub active: bool,
}

/// Display model of the conversation list pane.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ConversationListView {
    /// Entries sorted by recency, most recently updated first.
    pub entries: Vec<ConversationListEntry>,
}

/// Project `messages` into a transcript view, formatting each body and
/// clustering consecutive same-role messages.
#[must_use]
pub fn transcript(formatter: &TextFormatter, messages: &[Message]) -> TranscriptView {
    if messages.is_empty() {
        return TranscriptView::Empty {
            body: EMPTY_STATE_BODY.to_string(),
        };
    }
    let mut groups: Vec<MessageGroup> = Vec::new();
    for message in messages {
        let body = formatter.format(&message.content);
        match groups.last_mut() {
            Some(group) if group.role == message.role => group.bodies.push(body),
            _ => groups.push(MessageGroup {
                role: message.role,
                bodies: vec![body],
            }),
        }
    }
    TranscriptView::Conversation { groups }
}

/// Project the record set into the list view: sorted by `updated_at`
/// descending, ties kept in store order, `active` marking the entry whose
/// id equals `active_id`.
#[must_use]
pub fn conversation_list(
    conversations: &[Conversation],
    active_id: ConversationId,
) -> ConversationListView {
    let mut ordered: Vec<&Conversation> = conversations.iter().collect();
    ordered.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    ConversationListView {
        entries: ordered
            .into_iter()
            .map(|c| ConversationListEntry {
                id: c.id,
                title: c.title.clone(),
                active: c.id == active_id,
            })
            .collect(),
    }
}

/// Boundary the rendering layer subscribes on: the session pushes fresh
/// display models and busy-state changes through this sink.
pub trait RenderSink: Send + Sync {
    /// The active conversation's transcript changed.
    fn transcript_changed(&self, view: &TranscriptView);

    /// The conversation list changed.
    fn conversation_list_changed(&self, view: &ConversationListView);

    /// The input control's busy state changed.
    fn busy_changed(&self, busy: bool);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use chrono::{DateTime, Utc};

    use super::*;

    fn formatter() -> TextFormatter {
        match TextFormatter::new() {
            Ok(formatter) => formatter,
            Err(err) => panic!("stage patterns must compile: {err}"),
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap_or_default()
    }

    fn conversation_updated_at(seconds: i64) -> Conversation {
        let mut conversation = Conversation::draft(ConversationId::new());
        conversation.push(Message::at(MessageRole::User, "hi", at(seconds)));
        conversation
    }

    #[test]
    fn test_empty_transcript_shows_welcome_block() {
        let view = transcript(&formatter(), &[]);
        assert_eq!(
            view,
            TranscriptView::Empty {
                body: EMPTY_STATE_BODY.to_string()
            }
        );
    }

    #[test]
    fn test_consecutive_same_role_messages_cluster() {
        let messages = vec![
            Message::at(MessageRole::Assistant, "welcome", at(0)),
            Message::at(MessageRole::User, "one", at(1)),
            Message::at(MessageRole::User, "two", at(2)),
            Message::at(MessageRole::Assistant, "reply", at(3)),
        ];
        let view = transcript(&formatter(), &messages);
        let TranscriptView::Conversation { groups } = view else {
            panic!("expected grouped transcript");
        };
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].role, MessageRole::Assistant);
        assert_eq!(groups[1].bodies, vec!["one", "two"]);
        assert_eq!(groups[2].bodies, vec!["reply"]);
    }

    #[test]
    fn test_transcript_bodies_are_formatted() {
        let messages = vec![Message::at(MessageRole::Assistant, "**bold**", at(0))];
        let view = transcript(&formatter(), &messages);
        let TranscriptView::Conversation { groups } = view else {
            panic!("expected grouped transcript");
        };
        assert_eq!(groups[0].bodies, vec!["<strong>bold</strong>"]);
    }

    #[test]
    fn test_list_sorted_by_recency_descending() {
        let t1 = conversation_updated_at(1);
        let t2 = conversation_updated_at(2);
        let t3 = conversation_updated_at(3);
        let store_order = vec![t1.clone(), t2.clone(), t3.clone()];
        let view = conversation_list(&store_order, t2.id);
        let ids: Vec<ConversationId> = view.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![t3.id, t2.id, t1.id]);
        assert!(view.entries[1].active);
        assert!(!view.entries[0].active);
    }

    #[test]
    fn test_list_ties_keep_store_order() {
        let a = conversation_updated_at(5);
        let mut b = conversation_updated_at(5);
        b.updated_at = a.updated_at;
        let view = conversation_list(&[a.clone(), b.clone()], a.id);
        assert_eq!(view.entries[0].id, a.id);
        assert_eq!(view.entries[1].id, b.id);
    }
}
