//! Conversation types and state management

pub mod ids;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use ids::IdGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation. Never changed after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: String, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The record of a single session: ordered transcript, busy flag and id.
///
/// Readers get shared access only. Mutation is crate-private and goes
/// through [`ChatSession`](crate::core::ChatSession).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    is_busy: bool,
    session_id: String,
}

impl ConversationState {
    /// A fresh, empty, idle session
    pub(crate) fn new(session_id: String) -> Self {
        Self {
            messages: Vec::new(),
            is_busy: false,
            session_id,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.is_busy = busy;
    }

    /// Replace everything with a fresh session under `session_id`
    pub(crate) fn reset(&mut self, session_id: String) {
        *self = Self::new(session_id);
    }
}
