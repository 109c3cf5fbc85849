//! Folio chat client
//!
//! Keeps one chat session's transcript, exchanges messages with the
//! portfolio chat backend, and turns failed exchanges into transcript
//! entries the user can read.

pub mod config;
pub mod conversation;
pub mod core;
pub mod providers;

pub use config::Config;
pub use conversation::{ConversationState, IdGenerator, Message, Role};
pub use self::core::{ChatSession, SendOutcome};
pub use providers::{BackendError, ChatBackend, HttpBackend};
