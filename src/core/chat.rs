//! Session controller
//!
//! The ChatSession owns the conversation state and is the only thing that
//! mutates it. A `send`:
//! 1. Trims the input and drops it if empty or if an exchange is in flight
//! 2. Appends the user message and marks the session busy
//! 3. Performs one exchange with the backend
//! 4. Appends the reply, or a failure explanation, and clears busy
//!
//! Failures never leave this module; they end up in the transcript.
//!
//! The state lock is never held across an await, so `clear` can run while a
//! `send` is waiting on the backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::conversation::{ConversationState, IdGenerator, Message, Role};
use crate::providers::{BackendError, ChatBackend, ChatRequest};

/// What a call to [`ChatSession::send`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or another exchange was in flight. Nothing changed.
    Ignored,
    /// The assistant reply was appended
    Replied,
    /// A failure explanation was appended
    Failed,
    /// The session was cleared while waiting; the result was dropped
    Discarded,
}

struct Inner {
    state: ConversationState,
    ids: IdGenerator,
    api_key: Option<String>,
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    inner: Mutex<Inner>,
}

/// Clears busy if a `send` is dropped before its exchange completes.
///
/// Only touches the session the exchange was issued under.
struct PendingExchange<'a> {
    session: &'a ChatSession,
    session_id: String,
    completed: bool,
}

impl Drop for PendingExchange<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }

        let mut inner = self.session.lock();
        if inner.state.session_id() == self.session_id {
            debug!(session_id = %self.session_id, "Send cancelled, clearing busy flag");
            inner.state.set_busy(false);
        }
    }
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self::with_ids(backend, IdGenerator::new())
    }

    /// Use a specific id generator, e.g. one with a seeded rng
    pub fn with_ids(backend: Arc<dyn ChatBackend>, mut ids: IdGenerator) -> Self {
        let state = ConversationState::new(ids.new_session_id());
        Self {
            backend,
            inner: Mutex::new(Inner {
                state,
                ids,
                api_key: None,
            }),
        }
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.inner
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .api_key = normalize_key(key);
        self
    }

    // Every critical section leaves the state consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the credential sent with subsequent requests. Blank clears it.
    pub fn set_api_key(&self, key: Option<String>) {
        self.lock().api_key = normalize_key(key);
    }

    /// A copy of the current conversation state
    pub fn snapshot(&self) -> ConversationState {
        self.lock().state.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().state.is_busy()
    }

    pub fn session_id(&self) -> String {
        self.lock().state.session_id().to_string()
    }

    /// Send a user message and record the outcome in the transcript.
    ///
    /// Dropping the returned future before it completes keeps the user
    /// message but releases the busy flag.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let content = text.trim();
        if content.is_empty() {
            return SendOutcome::Ignored;
        }

        let request = {
            let mut inner = self.lock();
            if inner.state.is_busy() {
                debug!("Exchange already in flight, ignoring send");
                return SendOutcome::Ignored;
            }

            let id = inner.ids.new_message_id();
            inner.state.push(Message::new(id, Role::User, content));
            inner.state.set_busy(true);

            ChatRequest {
                message: content.to_string(),
                session_id: inner.state.session_id().to_string(),
                openrouter_key: inner.api_key.clone(),
            }
        };

        let mut pending = PendingExchange {
            session: self,
            session_id: request.session_id.clone(),
            completed: false,
        };

        debug!(session_id = %request.session_id, "Sending chat message");

        let result = self.backend.chat(&request).await;
        pending.completed = true;

        let (reply, outcome) = match result {
            Ok(reply) => (reply.response, SendOutcome::Replied),
            Err(e) => {
                warn!(session_id = %request.session_id, error = %e, "Chat exchange failed");
                (failure_message(&e), SendOutcome::Failed)
            }
        };

        let mut inner = self.lock();

        // Cleared while we waited: this result belongs to a session that no longer exists.
        // The busy flag now belongs to the new session and is left alone.
        if inner.state.session_id() != request.session_id {
            debug!(
                stale = %request.session_id,
                current = %inner.state.session_id(),
                "Discarding result for cleared session"
            );
            return SendOutcome::Discarded;
        }

        let id = inner.ids.new_message_id();
        inner.state.push(Message::new(id, Role::Assistant, reply));
        inner.state.set_busy(false);

        outcome
    }

    /// Start over with an empty session under a new id.
    ///
    /// The backend is asked to forget the old session first; whether that
    /// works has no effect on the reset.
    pub async fn clear(&self) {
        let old_session = self.session_id();

        if let Err(e) = self.backend.delete_session(&old_session).await {
            debug!(session_id = %old_session, error = %e, "Session deletion failed, ignoring");
        }

        let mut inner = self.lock();
        let fresh = inner.ids.new_session_id();
        debug!(old = %old_session, new = %fresh, "Conversation cleared");
        inner.state.reset(fresh);
    }
}

/// Transcript text for a failed exchange
fn failure_message(error: &BackendError) -> String {
    format!(
        "Error: {}. Make sure the chat backend is running and reachable, and your OpenRouter API key is set.",
        error
    )
}

fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}
