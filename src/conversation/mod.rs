//! Conversation management module.
//!
//! Identifiers, the message and conversation records, and the persisted
//! store that owns them.

pub mod ids;
pub mod store;
pub mod types;

pub use ids::ConversationId;
pub use store::ConversationStore;
pub use types::{Conversation, Message, MessageRole};
