//! Client configuration

use memchat_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::retry::RetryConfig;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws/chat";

/// Chat client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket URL of the chat endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Backoff for sends issued while disconnected
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Check that the endpoint is a `ws://` or `wss://` URL.
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::Connection(format!("invalid endpoint {}: {e}", self.endpoint)))?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::Connection(format!(
                "unsupported endpoint scheme: {other}"
            ))),
        }
    }
}
