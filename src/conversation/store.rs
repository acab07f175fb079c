//! Persisted conversation store.
//!
//! Exclusive owner of persistence: the full record set is serialized as a
//! single JSON blob under one well-known key and rewritten after every
//! mutation. Loading fails soft: an absent or undecodable blob yields an
//! empty store, never an error to the caller.

use tracing::{error, warn};

use crate::storage::{StorageBackend, StorageError};

use super::ids::ConversationId;
use super::types::Conversation;

/// Owns the full id-to-conversation mapping and its persistence.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    backend: Box<dyn StorageBackend>,
}

impl ConversationStore {
    /// Well-known storage key of the serialized record set.
    pub const STORAGE_KEY: &'static str = "nexusai_conversations";

    /// Load the persisted record set from `backend`.
    ///
    /// Absence, a backend read failure, or an undecodable blob all yield
    /// an empty store; prior history is then lost silently.
    #[must_use]
    pub fn load(backend: Box<dyn StorageBackend>) -> Self {
        let conversations = match backend.read(Self::STORAGE_KEY) {
            Ok(Some(raw)) => match decode_blob(&raw) {
                Ok(list) => list,
                Err(err) => {
                    warn!("discarding undecodable conversation blob: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("failed to read persisted conversations: {err}");
                Vec::new()
            }
        };
        Self {
            conversations,
            backend,
        }
    }

    /// Serialize the full record set and write it to the backend.
    ///
    /// Persistence is best-effort: a failure is logged and absorbed, the
    /// in-memory state stays authoritative for the session.
    pub fn save(&self) {
        match serde_json::to_string(&self.conversations) {
            Ok(raw) => {
                if let Err(err) = self.backend.write(Self::STORAGE_KEY, &raw) {
                    error!("failed to persist conversations: {err}");
                }
            }
            Err(err) => error!("failed to serialize conversations: {err}"),
        }
    }

    /// Insert `conversation` if its id is unseen (newest first), replace
    /// the existing record otherwise. Flushes.
    pub fn upsert(&mut self, conversation: Conversation) {
        match self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
        {
            Some(slot) => *slot = conversation,
            None => self.conversations.insert(0, conversation),
        }
        self.save();
    }

    /// Delete the record for `id`; no-op if absent. Flushes on change.
    pub fn remove(&mut self, id: ConversationId) {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() != before {
            self.save();
        }
    }

    /// The record for `id`, or a fresh draft if none exists. The draft is
    /// not inserted; it becomes persistent only through [`Self::upsert`].
    #[must_use]
    pub fn get(&self, id: ConversationId) -> Conversation {
        self.conversations
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap_or_else(|| Conversation::draft(id))
    }

    /// Whether a record for `id` is stored.
    #[must_use]
    pub fn contains(&self, id: ConversationId) -> bool {
        self.conversations.iter().any(|c| c.id == id)
    }

    /// All records in store order (newest-created first).
    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }
}

/// Decode the persisted record set.
fn decode_blob(raw: &str) -> Result<Vec<Conversation>, StorageError> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crate::conversation::types::{Message, MessageRole};
    use crate::storage::{MemoryStorage, StorageError};

    use super::*;

    /// Backend whose writes always fail.
    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
    }

    fn stored_conversation(content: &str) -> Conversation {
        let mut conversation = Conversation::draft(ConversationId::new());
        conversation.push(Message::new(MessageRole::User, content));
        conversation
    }

    #[test]
    fn test_load_from_empty_backend_is_empty() {
        let store = ConversationStore::load(Box::new(MemoryStorage::new()));
        assert!(store.conversations().is_empty());
    }

    #[test]
    fn test_malformed_blob_yields_empty_store() {
        let backend = MemoryStorage::with_entry(ConversationStore::STORAGE_KEY, "{not json!");
        let store = ConversationStore::load(Box::new(backend));
        assert!(store.conversations().is_empty());
    }

    #[test]
    fn test_save_load_round_trip_preserves_all_fields() {
        let backend = std::sync::Arc::new(MemoryStorage::new());
        let mut store = ConversationStore::load(Box::new(std::sync::Arc::clone(&backend)));
        store.upsert(stored_conversation("first"));
        store.upsert(stored_conversation("second"));

        let reloaded = ConversationStore::load(Box::new(backend));
        assert_eq!(reloaded.conversations(), store.conversations());
    }

    #[test]
    fn test_upsert_front_inserts_new_and_replaces_existing() {
        let mut store = ConversationStore::load(Box::new(MemoryStorage::new()));
        let first = stored_conversation("a");
        let second = stored_conversation("b");
        store.upsert(first.clone());
        store.upsert(second.clone());
        assert_eq!(store.conversations()[0].id, second.id);
        assert_eq!(store.conversations()[1].id, first.id);

        let mut renamed = first.clone();
        renamed.title = "Named".to_string();
        store.upsert(renamed);
        assert_eq!(store.conversations().len(), 2);
        assert_eq!(store.conversations()[1].title, "Named");
    }

    #[test]
    fn test_remove_is_noop_for_absent_id() {
        let mut store = ConversationStore::load(Box::new(MemoryStorage::new()));
        store.upsert(stored_conversation("keep"));
        store.remove(ConversationId::new());
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn test_get_returns_draft_without_inserting() {
        let store = ConversationStore::load(Box::new(MemoryStorage::new()));
        let id = ConversationId::new();
        let draft = store.get(id);
        assert_eq!(draft.id, id);
        assert_eq!(draft.title, Conversation::DEFAULT_TITLE);
        assert!(draft.messages.is_empty());
        assert!(!store.contains(id));
    }

    #[test]
    fn test_write_failure_is_absorbed() {
        let mut store = ConversationStore::load(Box::new(BrokenStorage));
        let conversation = stored_conversation("still here");
        store.upsert(conversation.clone());
        assert!(store.contains(conversation.id));
    }
}
