//! Application configuration
//!
//! Layered in order of increasing priority:
//! 1. embedded `config/default.toml`
//! 2. optional `config/default`, `config/{MEMCHAT_ENV}`, `config/local`
//! 3. `MEMCHAT_*` environment variables (`MEMCHAT_CLIENT__ENDPOINT`, ...)

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use memchat_client::ClientConfig;
use serde::{Deserialize, Serialize};

/// Embedded defaults (always available)
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Credential settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token pre-filled into the token field (empty = ask)
    #[serde(default)]
    pub token: String,
}

impl AuthConfig {
    /// The configured token, if any.
    pub fn token(&self) -> Option<&str> {
        Some(self.token.trim()).filter(|t| !t.is_empty())
    }
}

/// Log file settings (interactive mode only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    /// Copy with the token masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.auth.token().is_some() {
            config.auth.token = "********".to_string();
        }
        config
    }
}

/// Load configuration from all layers.
pub fn load_config() -> Result<AppConfig> {
    let env_name = std::env::var("MEMCHAT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{env_name}")).required(false))
        .add_source(File::with_name("config/local").required(false))
        // MEMCHAT_CLIENT__ENDPOINT -> client.endpoint
        .add_source(
            Environment::with_prefix("MEMCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
