//! HTTP chat backend
//!
//! Talks to the portfolio chat service:
//! - `POST   {base}/api/chat`
//! - `DELETE {base}/api/chat/{session_id}`
//! - `GET    {base}/api/health`

use std::time::Duration;

use reqwest::{Client, Response};

use async_trait::async_trait;

use super::{
    BackendError, ChatBackend, ChatReply, ChatRequest, ErrorBody, HealthStatus, GENERIC_FAILURE,
};

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-success response into `Rejected`, reading `detail` when the body has one
    async fn rejection(response: Response) -> BackendError {
        let status = response.status().as_u16();
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());

        BackendError::Rejected { status, detail }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response.json::<ChatReply>().await.map_err(|e| {
            if e.is_decode() {
                BackendError::InvalidResponse(e.to_string())
            } else {
                BackendError::Transport(e)
            }
        })
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(format!("{}/api/chat/{}", self.base_url, session_id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, BackendError> {
        let response = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let status: HealthStatus = response.json().await?;
        if status.status.is_empty() {
            return Err(BackendError::InvalidResponse("empty health status".into()));
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> HttpBackend {
        HttpBackend::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn request(key: Option<&str>) -> ChatRequest {
        ChatRequest {
            message: "What's your tech stack?".to_string(),
            session_id: "session_1_abcdefghi".to_string(),
            openrouter_key: key.map(str::to_string),
        }
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({
                "message": "What's your tech stack?",
                "session_id": "session_1_abcdefghi",
                "openrouter_key": "sk-or-test"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Java, Python, Kotlin, ML",
                "session_id": "session_1_abcdefghi"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = backend(&server).chat(&request(Some("sk-or-test"))).await.unwrap();
        assert_eq!(reply.response, "Java, Python, Kotlin, ML");
    }

    #[tokio::test]
    async fn test_chat_rejected_with_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "rate limited" })))
            .mount(&server)
            .await;

        let err = backend(&server).chat(&request(None)).await.unwrap_err();
        match err {
            BackendError::Rejected { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_rejected_without_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = backend(&server).chat(&request(None)).await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_chat_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = backend(&server).chat(&request(None)).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_reply_missing_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "s" })))
            .mount(&server)
            .await;

        let err = backend(&server).chat(&request(None)).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
        assert!(err.to_string().starts_with("Invalid response:"));
    }

    #[tokio::test]
    async fn test_chat_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "late" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri(), Duration::from_millis(100)).unwrap();
        let err = backend.chat(&request(None)).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/chat/session_1_abcdefghi"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "Chat history cleared" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        backend(&server)
            .delete_session("session_1_abcdefghi")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "timestamp": "2026-01-01T00:00:00"
            })))
            .mount(&server)
            .await;

        let health = backend(&server).health().await.unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Nothing listens on port 1.
        let backend = HttpBackend::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = backend.chat(&request(None)).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
