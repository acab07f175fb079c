//! Session orchestration.
//!
//! A [`ConversationSession`] owns the active conversation pointer and
//! coordinates one user turn end to end: append the user message, render,
//! dispatch, append the outcome, render again. A busy flag makes turns
//! mutually exclusive: a second submission while a dispatch is in flight
//! is rejected, never queued.
//!
//! In-flight policy: a reply (or failure) is always appended to the
//! conversation id the dispatch was sent for, never to whatever is active
//! when it resolves. Switching or starting a new conversation mid-flight
//! therefore cannot misfile a reply; deleting the originating conversation
//! mid-flight recreates it through the lazy-default record.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::conversation::{Conversation, ConversationId, ConversationStore, Message, MessageRole};
use crate::dispatch::MessageDispatcher;
use crate::format::TextFormatter;
use crate::render::{self, RenderSink};

/// Seeded assistant greeting of every newly started conversation.
pub const WELCOME_MESSAGE: &str = "Hello! I'm NexusAI. How can I assist you today? \
     I can help with flight cancellations, travel information, and more.";

/// Prompt passed to the confirmation gate before a deletion.
const DELETE_PROMPT: &str = "Are you sure you want to delete this conversation?";

/// Maximum title length derived from the first user message.
const TITLE_MAX_CHARS: usize = 30;

/// Rejections of a session operation. Dispatch failures are not session
/// errors; they surface as system messages in the transcript.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    /// The submitted text was empty after trimming.
    #[error("message is empty")]
    Empty,
    /// A dispatch is already in flight on this session.
    #[error("a dispatch is already in flight")]
    Busy,
}

/// External confirmation gate guarding destructive actions. The widget
/// core never decides a deletion on its own.
pub trait ConfirmationGate: Send + Sync {
    /// Ask the user to confirm `prompt`; `true` proceeds.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Clears the busy flag when the turn ends, on every path.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    sink: &'a dyn RenderSink,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Relaxed);
        self.sink.busy_changed(false);
    }
}

/// Tracks the active conversation and coordinates dispatch and store
/// updates for it.
pub struct ConversationSession {
    store: RwLock<ConversationStore>,
    active: RwLock<ConversationId>,
    busy: AtomicBool,
    dispatcher: Arc<dyn MessageDispatcher>,
    gate: Arc<dyn ConfirmationGate>,
    sink: Arc<dyn RenderSink>,
    formatter: TextFormatter,
}

impl ConversationSession {
    /// Create a session over `store` with a fresh active conversation id
    /// and emit the initial views (an empty transcript; no message is
    /// seeded until a new conversation is explicitly started).
    pub async fn new(
        store: ConversationStore,
        dispatcher: Arc<dyn MessageDispatcher>,
        gate: Arc<dyn ConfirmationGate>,
        sink: Arc<dyn RenderSink>,
        formatter: TextFormatter,
    ) -> Self {
        let session = Self {
            store: RwLock::new(store),
            active: RwLock::new(ConversationId::new()),
            busy: AtomicBool::new(false),
            dispatcher,
            gate,
            sink,
            formatter,
        };
        session.emit_views().await;
        session
    }

    /// Submit one user turn on the active conversation.
    ///
    /// Appends the user message, dispatches it with the full history, and
    /// appends the assistant reply, or a system message describing the
    /// failure. The busy flag is cleared last on every path.
    ///
    /// # Errors
    /// [`SessionError::Empty`] if `text` trims to nothing,
    /// [`SessionError::Busy`] if a dispatch is already in flight; both
    /// reject without any side effect.
    pub async fn submit_user_message(&self, text: &str) -> Result<(), SessionError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(SessionError::Empty);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return Err(SessionError::Busy);
        }
        let guard = BusyGuard {
            flag: &self.busy,
            sink: self.sink.as_ref(),
        };
        self.sink.busy_changed(true);

        let origin = *self.active.read().await;
        let history = {
            let mut store = self.store.write().await;
            let mut conversation = store.get(origin);
            conversation.push(Message::new(MessageRole::User, message));
            let history = conversation.messages.clone();
            store.upsert(conversation);
            history
        };
        self.emit_views().await;

        debug!(conversation = %origin, "dispatching user message");
        match self.dispatcher.send(message, origin, &history).await {
            Ok(reply) => {
                let mut store = self.store.write().await;
                let mut conversation = store.get(origin);
                conversation.push(Message::new(MessageRole::Assistant, reply.text));
                apply_title_rule(&mut conversation);
                store.upsert(conversation);
            }
            Err(err) => {
                warn!(conversation = %origin, "dispatch failed: {err}");
                let mut store = self.store.write().await;
                let mut conversation = store.get(origin);
                conversation.push(Message::new(MessageRole::System, format!("Error: {err}")));
                store.upsert(conversation);
            }
        }
        self.emit_views().await;

        drop(guard);
        Ok(())
    }

    /// Start a new conversation: fresh id, active pointer reset, one
    /// seeded assistant welcome message, persisted.
    pub async fn start_new_conversation(&self) -> ConversationId {
        let id = ConversationId::new();
        *self.active.write().await = id;
        {
            let mut store = self.store.write().await;
            let mut conversation = store.get(id);
            conversation.push(Message::new(MessageRole::Assistant, WELCOME_MESSAGE));
            store.upsert(conversation);
        }
        self.emit_views().await;
        info!(conversation = %id, "started new conversation");
        id
    }

    /// Make `id` the active conversation and render its transcript. No
    /// persistence effect.
    pub async fn switch_conversation(&self, id: ConversationId) {
        *self.active.write().await = id;
        self.emit_views().await;
        debug!(conversation = %id, "switched active conversation");
    }

    /// Delete `id` after passing the confirmation gate. Returns whether
    /// the deletion happened. Deleting the active conversation behaves
    /// like [`Self::start_new_conversation`].
    pub async fn delete_conversation(&self, id: ConversationId) -> bool {
        if !self.gate.confirm(DELETE_PROMPT) {
            return false;
        }
        {
            let mut store = self.store.write().await;
            store.remove(id);
        }
        if *self.active.read().await == id {
            self.start_new_conversation().await;
        } else {
            self.emit_views().await;
        }
        info!(conversation = %id, "deleted conversation");
        true
    }

    /// Currently active conversation id.
    pub async fn active_conversation(&self) -> ConversationId {
        *self.active.read().await
    }

    /// Snapshot of the conversation for `id` (a draft if unknown).
    pub async fn conversation(&self, id: ConversationId) -> Conversation {
        self.store.read().await.get(id)
    }

    /// Snapshot of all stored conversations in store order.
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.store.read().await.conversations().to_vec()
    }

    /// Whether a dispatch is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    /// Push fresh display models for the active conversation and the
    /// conversation list through the sink.
    async fn emit_views(&self) {
        let active = *self.active.read().await;
        let store = self.store.read().await;
        let transcript = render::transcript(&self.formatter, &store.get(active).messages);
        self.sink.transcript_changed(&transcript);
        let list = render::conversation_list(store.conversations(), active);
        self.sink.conversation_list_changed(&list);
    }
}

/// Assign the title from the first user message once the conversation has
/// a reply: fires only while the title is still the sentinel and at least
/// two messages exist, so it runs at most once per conversation.
fn apply_title_rule(conversation: &mut Conversation) {
    if !conversation.has_default_title() || conversation.messages.len() < 2 {
        return;
    }
    if let Some(first) = conversation.first_user_message() {
        conversation.title = truncate_title(&first.content);
    }
}

/// First [`TITLE_MAX_CHARS`] characters, with a trailing ellipsis marker
/// only when the content was longer.
fn truncate_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
