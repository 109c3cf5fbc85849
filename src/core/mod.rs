//! Core client components
//!
//! This module holds the session controller that drives the conversation.

mod chat;

pub use chat::{ChatSession, SendOutcome};
