//! TUI chat interface for Memchat
//!
//! Provides a full-screen terminal UI using ratatui + crossterm.

pub mod app;
pub mod event;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use memchat_client::{ChatClient, WsConnector};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::settings::AppConfig;
use app::App;

/// Run the TUI chat interface.
pub async fn run(config: AppConfig) -> Result<()> {
    config
        .client
        .validate()
        .context("Invalid client.endpoint")?;
    info!(endpoint = %config.client.endpoint, "TUI: starting chat client");

    let shutdown = CancellationToken::new();
    let (handle, events) = ChatClient::spawn_with_parent(
        config.client.clone(),
        Arc::new(WsConnector::new()),
        &shutdown,
    );

    // ── Terminal setup ──────────────────────────────────────────────

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(
        handle,
        events,
        config.client.endpoint.clone(),
        config.auth.token(),
    );

    // ── Main loop ───────────────────────────────────────────────────

    let tick_rate = Duration::from_millis(200);

    let run_result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        if let Err(e) = event::handle_events(&mut app, tick_rate) {
            break Err(e);
        }

        if app.should_quit {
            break Ok(());
        }
    };

    shutdown.cancel();
    info!("TUI: chat client stopped");

    // ── Restore terminal ────────────────────────────────────────────

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    run_result
}
