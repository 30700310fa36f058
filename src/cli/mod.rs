//! CLI module for Memchat
//!
//! Provides commands:
//! - `chat`: interactive terminal chat (default)
//! - `send`: send one message and print the reply
//! - `config`: inspect the effective configuration

use clap::{Parser, Subcommand};

use crate::settings::AppConfig;

pub mod config;
pub mod send;
pub mod tui;

/// Memchat CLI
#[derive(Parser, Debug)]
#[command(name = "memchat")]
#[command(about = "Chat with the memory search backend from your terminal")]
#[command(version)]
pub struct Cli {
    /// WebSocket endpoint (overrides client.endpoint)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Credential sent in the handshake (overrides auth.token)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Send one message and print the reply
    Send {
        /// Message text
        message: String,
        /// Seconds to wait for a reply
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: Option<config::ConfigCommands>,
    },
}

impl Cli {
    /// Whether this invocation takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Chat))
    }

    /// Apply command-line overrides on top of loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.client.endpoint = endpoint.clone();
        }
        if let Some(token) = &self.token {
            config.auth.token = token.clone();
        }
    }
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => tui::run(config).await,
        Commands::Send { message, timeout } => {
            send::run(config, message, std::time::Duration::from_secs(timeout)).await
        }
        Commands::Config { command } => {
            config::run(&config, command.unwrap_or(config::ConfigCommands::Show))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_interactive() {
        let cli = Cli::parse_from(["memchat"]);
        assert!(cli.is_interactive());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_send_is_not_interactive() {
        let cli = Cli::parse_from(["memchat", "send", "hello", "--timeout", "5"]);
        assert!(!cli.is_interactive());
        match cli.command {
            Some(Commands::Send { message, timeout }) => {
                assert_eq!(message, "hello");
                assert_eq!(timeout, 5);
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "memchat",
            "--endpoint",
            "ws://10.0.0.2:8000/ws/chat",
            "send",
            "hi",
            "--token",
            "abc",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.client.endpoint, "ws://10.0.0.2:8000/ws/chat");
        assert_eq!(config.auth.token(), Some("abc"));
    }
}
