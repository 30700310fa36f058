//! One-shot send
//!
//! Runs the same client as the TUI: the message goes through the normal
//! connect-then-retry path and every log line is printed to stdout.

use anyhow::{bail, Result};
use memchat_client::{client::CONNECTION_CLOSED, ChatClient, UiEvent};
use memchat_core::{Sender, MESSAGE_NOT_SENT};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::settings::AppConfig;

pub async fn run(config: AppConfig, message: String, timeout: Duration) -> Result<()> {
    config.client.validate()?;

    let (handle, mut events) = ChatClient::spawn_ws(config.client.clone());
    handle.set_credential(config.auth.token.clone())?;
    handle.send_message(message)?;

    let outcome = tokio::time::timeout(timeout, wait_for_reply(&mut events)).await;
    handle.shutdown();

    match outcome {
        Ok(result) => result,
        Err(_) => bail!("No reply within {}s", timeout.as_secs()),
    }
}

/// Print lines until the first reply.
///
/// A close before the message went out is left to the client's retry
/// schedule; a close after it means no reply is coming.
async fn wait_for_reply(events: &mut mpsc::UnboundedReceiver<UiEvent>) -> Result<()> {
    let mut delivered = false;
    while let Some(event) = events.recv().await {
        match event {
            UiEvent::Line(line) => {
                println!("{line}");
                match line.sender {
                    Sender::Bot | Sender::BotRaw => return Ok(()),
                    Sender::You => delivered = true,
                    Sender::System if line.text == MESSAGE_NOT_SENT => {
                        bail!("Could not reach the server")
                    }
                    Sender::System if delivered && line.text == CONNECTION_CLOSED => {
                        bail!("Connection closed before a reply arrived")
                    }
                    Sender::System => {}
                }
            }
            UiEvent::Alert(alert) => bail!("{alert} (pass --token or set MEMCHAT_AUTH__TOKEN)"),
            UiEvent::State(state) => debug!(%state, "Connection state changed"),
            UiEvent::InputRevealed => {}
        }
    }
    bail!("Chat client stopped")
}
