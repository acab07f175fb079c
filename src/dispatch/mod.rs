//! Message dispatch to the remote assistant endpoint.
//!
//! One dispatch is one network round trip carrying the user message plus
//! conversation history and yielding a reply or a failure. A single
//! attempt per invocation: no retry, no cancellation. Dispatchers never
//! mutate conversation state; the session turns results into messages.

pub mod error;
pub mod http;

pub use error::DispatchError;
pub use http::HttpDispatcher;

use async_trait::async_trait;

use crate::conversation::{ConversationId, Message};

/// A successful assistant reply.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssistantReply {
    /// Reply body, raw markup as produced by the assistant.
    pub text: String,
}

/// Seam to the remote assistant. Object-safe so sessions can take a fake
/// in tests and a [`HttpDispatcher`] in production.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Send `message` with the conversation's history and resolve to the
    /// assistant's reply.
    ///
    /// # Errors
    /// Returns a [`DispatchError`] describing the transport, remote, or
    /// network failure of this single attempt.
    async fn send(
        &self,
        message: &str,
        conversation_id: ConversationId,
        history: &[Message],
    ) -> Result<AssistantReply, DispatchError>;
}
