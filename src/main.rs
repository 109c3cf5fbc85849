//! Folio - terminal chat client
//!
//! Reads lines from stdin and drives a single chat session against the
//! portfolio chat backend.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_chat::{ChatBackend, ChatSession, Config, HttpBackend, SendOutcome};

const SUGGESTED_QUESTIONS: &[&str] = &[
    "What's your tech stack?",
    "Tell me about your projects",
    "Are you open to internships?",
    "What are your strongest skills?",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_chat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let backend = Arc::new(HttpBackend::new(&config.api_base, config.request_timeout())?);

    match backend.health().await {
        Ok(health) => tracing::info!("Chat backend at {} is {}", config.api_base, health.status),
        Err(e) => tracing::warn!("Chat backend at {} unreachable: {}", config.api_base, e),
    }

    let session = ChatSession::new(backend).with_api_key(config.openrouter_key.clone());

    println!("Ask me anything. Commands: /suggest, /key <openrouter key>, /clear, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/clear", _) => {
                session.clear().await;
                println!("-- new session {} --", session.session_id());
            }
            ("/key", key) => {
                session.set_api_key(Some(key.to_string()));
                println!("-- key updated --");
            }
            ("/suggest", _) => {
                for question in SUGGESTED_QUESTIONS {
                    println!("  {question}");
                }
            }
            _ => {
                if session.send(line).await != SendOutcome::Ignored {
                    if let Some(message) = session.snapshot().last_message() {
                        println!("{}", message.content);
                    }
                }
            }
        }
    }

    Ok(())
}
