//! TUI application state management

use memchat_client::{ChatHandle, ConnectionState, UiEvent};
use memchat_core::{ChatLog, Sender};
use ratatui::style::Style;
use ratatui::widgets::ScrollbarState;
use tokio::sync::mpsc;
use tracing::debug;
use tui_textarea::TextArea;

/// Maximum number of input history entries retained.
const MAX_HISTORY: usize = 50;

const HELP_TEXT: &str = "Commands:\n\
     \x20 /clear           Clear chat\n\
     \x20 /help            Show this help\n\
     \x20 /quit            Exit\n\
     \n\
     Keys:\n\
     \x20 Enter            Connect (token) / Send (message)\n\
     \x20 Tab              Switch between token and message\n\
     \x20 \u{2191}/\u{2193}              Input history\n\
     \x20 PageUp/PageDn    Scroll chat\n\
     \x20 Mouse scroll     Scroll chat\n\
     \x20 Esc              Dismiss alert / Quit\n\
     \x20 Ctrl+C           Quit";

/// Which input receives key presses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Token,
    Message,
}

/// Main application state.
pub struct App {
    pub log: ChatLog,
    /// Masked credential field
    pub token_input: TextArea<'static>,
    /// Message field, drawn only once a connection has opened
    pub textarea: TextArea<'static>,
    pub focus: Focus,
    pub input_visible: bool,
    /// Blocking alert; swallows input until dismissed
    pub alert: Option<String>,
    pub state: ConnectionState,
    pub endpoint: String,
    pub scroll_offset: usize,
    pub scrollbar_state: ScrollbarState,
    pub should_quit: bool,
    /// Previous messages for up/down navigation.
    input_history: Vec<String>,
    /// Current position in input history (None = new input).
    history_index: Option<usize>,
    handle: ChatHandle,
    /// Polled each frame by the event loop.
    events: mpsc::UnboundedReceiver<UiEvent>,
}

impl App {
    pub fn new(
        handle: ChatHandle,
        events: mpsc::UnboundedReceiver<UiEvent>,
        endpoint: String,
        token: Option<&str>,
    ) -> Self {
        let mut app = Self {
            log: ChatLog::new(),
            token_input: new_token_input(token.unwrap_or_default()),
            textarea: new_textarea(),
            focus: Focus::Token,
            input_visible: false,
            alert: None,
            state: ConnectionState::Unopened,
            endpoint,
            scroll_offset: 0,
            scrollbar_state: ScrollbarState::default(),
            should_quit: false,
            input_history: Vec::new(),
            history_index: None,
            handle,
            events,
        };

        if token.is_some() {
            app.token_changed();
        }
        app
    }

    // ── helpers ──────────────────────────────────────────────────────────

    fn push_system(&mut self, content: impl Into<String>) {
        self.log.append(Sender::System, content);
        self.scroll_to_bottom();
    }

    /// Scroll to the bottom of the chat history.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Current contents of the token field.
    pub fn token(&self) -> String {
        self.token_input.lines().join("")
    }

    /// Forward the token field to the client; the next connect uses it.
    pub fn token_changed(&mut self) {
        let token = self.token();
        if let Err(e) = self.handle.set_credential(token) {
            self.push_system(e.user_message());
        }
    }

    /// Switch focus between the two inputs once the message input is shown.
    pub fn toggle_focus(&mut self) {
        if !self.input_visible {
            return;
        }
        self.focus = match self.focus {
            Focus::Token => Focus::Message,
            Focus::Message => Focus::Token,
        };
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    // ── client events ───────────────────────────────────────────────────

    /// Called every tick to drain events from the chat client.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                UiEvent::Line(line) => {
                    self.log.push(line);
                    self.scroll_to_bottom();
                }
                UiEvent::Alert(message) => self.alert = Some(message),
                UiEvent::InputRevealed => {
                    if !self.input_visible {
                        self.input_visible = true;
                        self.focus = Focus::Message;
                    }
                }
                UiEvent::State(state) => {
                    debug!(%state, "Connection state changed");
                    self.state = state;
                }
            }
        }
    }

    // ── input handling ──────────────────────────────────────────────────

    /// Returns true if the message input is empty (single empty line).
    pub fn is_input_empty(&self) -> bool {
        self.textarea.lines().len() == 1 && self.textarea.lines()[0].is_empty()
    }

    /// Navigate to the previous entry in input history.
    pub fn history_up(&mut self) {
        if self.input_history.is_empty() {
            return;
        }
        let idx = match self.history_index {
            None => self.input_history.len() - 1,
            Some(0) => return,
            Some(i) => i - 1,
        };
        self.history_index = Some(idx);
        self.textarea = textarea_with(self.input_history[idx].clone());
    }

    /// Navigate to the next entry in input history, or clear if at the end.
    pub fn history_down(&mut self) {
        match self.history_index {
            None => {}
            Some(i) if i + 1 >= self.input_history.len() => {
                self.history_index = None;
                self.textarea = new_textarea();
            }
            Some(i) => {
                self.history_index = Some(i + 1);
                self.textarea = textarea_with(self.input_history[i + 1].clone());
            }
        }
    }

    // ── submit ──────────────────────────────────────────────────────────

    /// Enter on the token field.
    pub fn submit_token(&mut self) {
        self.token_changed();
        if let Err(e) = self.handle.connect() {
            self.push_system(e.user_message());
        }
    }

    /// Enter on the message field: either a `/command` or a chat message.
    pub fn submit(&mut self) {
        let text = self.textarea.lines().join("\n");
        if text.is_empty() {
            return;
        }

        self.input_history.push(text.clone());
        if self.input_history.len() > MAX_HISTORY {
            self.input_history.remove(0);
        }
        self.history_index = None;

        self.textarea = new_textarea();

        let trimmed = text.trim();
        if trimmed.starts_with('/') {
            self.handle_command(trimmed);
        } else {
            self.scroll_to_bottom();
            if let Err(e) = self.handle.send_message(text) {
                self.push_system(e.user_message());
            }
        }
    }

    fn handle_command(&mut self, cmd: &str) {
        let name = cmd.split_whitespace().next().unwrap_or(cmd);
        match name {
            "/quit" | "/exit" => {
                self.should_quit = true;
            }
            "/clear" => {
                self.log.clear();
                self.scroll_to_bottom();
            }
            "/help" => self.push_system(HELP_TEXT),
            _ => self.push_system(format!("Unknown command: {name}")),
        }
    }
}

/// Create a fresh message TextArea with default styling.
fn new_textarea() -> TextArea<'static> {
    let mut ta = TextArea::default();
    ta.set_cursor_line_style(Style::default());
    ta.set_placeholder_text("Type a message... (Enter to send)");
    ta.set_max_histories(50);
    ta
}

fn textarea_with(text: String) -> TextArea<'static> {
    let mut ta = TextArea::new(vec![text]);
    ta.set_cursor_line_style(Style::default());
    ta.move_cursor(tui_textarea::CursorMove::End);
    ta
}

fn new_token_input(token: &str) -> TextArea<'static> {
    let mut ta = TextArea::new(vec![token.to_string()]);
    ta.set_cursor_line_style(Style::default());
    ta.set_mask_char('\u{2022}');
    ta.set_placeholder_text("Paste your JWT token (Enter to connect)");
    ta.move_cursor(tui_textarea::CursorMove::End);
    ta
}
