//! Crossterm event handling for the TUI

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use std::time::Duration;

use super::app::{App, Focus};

/// Mouse scroll lines per event.
const MOUSE_SCROLL_LINES: u32 = 3;

/// Lines per PageUp/PageDown.
const PAGE_SCROLL_LINES: u32 = 10;

/// Drain client events, then wait up to `timeout` for one terminal event.
pub fn handle_events(app: &mut App, timeout: Duration) -> Result<()> {
    app.poll_events();

    if event::poll(timeout)? {
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
            Event::Mouse(mouse) => handle_mouse(app, mouse),
            Event::Paste(text) => paste(app, &text),
            _ => {}
        }
    }

    Ok(())
}

pub(super) fn handle_key(app: &mut App, key: KeyEvent) {
    if let (KeyModifiers::CONTROL, KeyCode::Char('c')) = (key.modifiers, key.code) {
        app.should_quit = true;
        return;
    }

    // Modal alert swallows everything except its own dismissal.
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.dismiss_alert();
        }
        return;
    }

    match (key.modifiers, key.code, app.focus) {
        (_, KeyCode::Esc, _) => app.should_quit = true,

        (_, KeyCode::Tab | KeyCode::BackTab, _) => app.toggle_focus(),

        (_, KeyCode::PageUp, _) => {
            for _ in 0..PAGE_SCROLL_LINES {
                app.scroll_up();
            }
        }
        (_, KeyCode::PageDown, _) => {
            for _ in 0..PAGE_SCROLL_LINES {
                app.scroll_down();
            }
        }

        (_, KeyCode::Enter, Focus::Token) => app.submit_token(),
        (_, KeyCode::Enter, Focus::Message) => app.submit(),

        (_, KeyCode::Up, Focus::Message) => app.history_up(),
        (_, KeyCode::Down, Focus::Message) => app.history_down(),

        (_, _, Focus::Token) => {
            if app.token_input.input(Event::Key(key)) {
                app.token_changed();
            }
        }
        (_, _, Focus::Message) => {
            app.textarea.input(Event::Key(key));
        }
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            for _ in 0..MOUSE_SCROLL_LINES {
                app.scroll_up();
            }
        }
        MouseEventKind::ScrollDown => {
            for _ in 0..MOUSE_SCROLL_LINES {
                app.scroll_down();
            }
        }
        _ => {}
    }
}

fn paste(app: &mut App, text: &str) {
    if app.alert.is_some() {
        return;
    }
    // Both fields are single line.
    let text = text.replace(['\r', '\n'], "");
    match app.focus {
        Focus::Token => {
            if app.token_input.insert_str(text) {
                app.token_changed();
            }
        }
        Focus::Message => {
            app.textarea.insert_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::app::tests::{settle, test_app};
    use super::*;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_blocks_input_until_dismissed() {
        let (mut app, connector) = test_app(None);
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;
        assert!(app.alert.is_some());

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.token(), "");

        press(&mut app, KeyCode::Esc);
        assert!(app.alert.is_none());
        assert!(!app.should_quit);
        assert_eq!(connector.opens(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typed_token_is_used_for_connect() {
        let (mut app, connector) = test_app(None);
        for c in "abc".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.token(), "abc");

        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;
        assert_eq!(connector.sent(0), vec![r#"{"jwt_token":"abc"}"#.to_string()]);
        assert!(app.input_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paste_strips_newlines() {
        let (mut app, _connector) = test_app(None);
        paste(&mut app, "tok\nen\r\n");
        assert_eq!(app.token(), "token");
    }

    #[tokio::test(start_paused = true)]
    async fn test_esc_and_ctrl_c_quit() {
        let (mut app, _connector) = test_app(None);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);

        let (mut app, _connector) = test_app(None);
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
