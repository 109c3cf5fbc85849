//! Application configuration
//!
//! Defaults, then an optional TOML file named by `FOLIO_CONFIG`, then
//! environment variables.
//!
//! ```toml
//! api_base = "http://localhost:8000"
//! openrouter_key = "sk-or-..."
//! request_timeout_secs = 30
//! ```

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub openrouter_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            openrouter_key: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|key| env::var(key).ok())?)
    }

    /// Build a config reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("FOLIO_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(base) = lookup("FOLIO_API_BASE") {
            config.api_base = base;
        }
        if let Some(key) = lookup("OPENROUTER_API_KEY") {
            config.openrouter_key = Some(key);
        }
        if let Some(secs) = lookup("FOLIO_TIMEOUT_SECS") {
            config.request_timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid FOLIO_TIMEOUT_SECS: {secs}")))?;
        }

        config.normalize()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.normalize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn normalize(mut self) -> Result<Self, ConfigError> {
        self.api_base = self.api_base.trim().trim_end_matches('/').to_string();
        if self.api_base.is_empty() {
            return Err(ConfigError::Validation("api_base must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be positive".into(),
            ));
        }

        self.openrouter_key = self
            .openrouter_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
