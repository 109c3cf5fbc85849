//! Chat backend integrations
//!
//! The backend is an external HTTP service. This module pins down only the
//! contract the client relies on: one chat exchange, session deletion and a
//! health check.

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpBackend;

/// Reason used when a failed response carries no `detail`
pub const GENERIC_FAILURE: &str = "Failed to get response";

#[derive(Debug, Error)]
pub enum BackendError {
    /// Non-success status; `detail` comes from the body or falls back to [`GENERIC_FAILURE`]
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Body of a chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openrouter_key: Option<String>,
}

/// Body of a successful chat response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of a failed chat response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// One request/response exchange with the chat endpoint
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    /// Ask the backend to drop its server-side state for `session_id`
    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError>;

    async fn health(&self) -> Result<HealthStatus, BackendError>;
}
