//! TUI rendering with ratatui

use chrono::Timelike;
use memchat_client::ConnectionState;
use memchat_core::Sender;
use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, Focus};

/// Main draw function: renders the full TUI layout.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let message_height = if app.input_visible { 3 } else { 0 };
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),              // status bar
            Constraint::Min(3),                 // chat
            Constraint::Length(3),              // token
            Constraint::Length(message_height), // message (hidden until connected)
        ])
        .split(frame.area());

    draw_status_bar(frame, app, outer[0]);
    draw_chat(frame, app, outer[1]);
    draw_token(frame, app, outer[2]);
    if app.input_visible {
        draw_input(frame, app, outer[3]);
    }

    if let Some(alert) = &app.alert {
        draw_alert(frame, alert);
    }
}

// ── status bar ──────────────────────────────────────────────────────────

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state_span = Span::styled(
        format!(" {} ", app.state.as_str().to_uppercase()),
        Style::default().bg(state_color(app.state)).fg(Color::Black).bold(),
    );

    let info_text = format!(
        " Memchat v{} \u{00b7} {}",
        env!("CARGO_PKG_VERSION"),
        app.endpoint
    );
    let right = "/help \u{00b7} Esc quit ";

    let mut spans = vec![state_span, Span::raw(info_text)];

    let used: usize = spans.iter().map(|s| s.content.width()).sum::<usize>() + right.width();
    let padding = (area.width as usize).saturating_sub(used);
    if padding > 0 {
        spans.push(Span::raw(" ".repeat(padding)));
    }
    spans.push(Span::styled(right, Style::default().fg(Color::DarkGray)));

    let p = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::Rgb(20, 20, 20)).fg(Color::White));
    frame.render_widget(p, area);
}

fn state_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Open => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Errored => Color::Red,
        ConnectionState::Unopened | ConnectionState::Closed => Color::Gray,
    }
}

// ── chat log ────────────────────────────────────────────────────────────

fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::You => Style::default().bold(),
        Sender::Bot => Style::default().fg(Color::Cyan).bold(),
        Sender::BotRaw => Style::default().fg(Color::Yellow).bold(),
        Sender::System => Style::default().fg(Color::Magenta).italic(),
    }
}

fn draw_chat(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut all_lines: Vec<Line> = Vec::new();
    for line in app.log.lines() {
        let ts = line.timestamp;
        let content_style = match line.sender {
            Sender::System => Style::default().fg(Color::Gray),
            _ => Style::default(),
        };

        // [12:30] Sender: first line
        let mut body = line.text.split('\n');
        all_lines.push(Line::from(vec![
            Span::styled(
                format!("[{:02}:{:02}] ", ts.hour(), ts.minute()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("{}:", line.sender), sender_style(line.sender)),
            Span::styled(
                format!(" {}", body.next().unwrap_or_default()),
                content_style,
            ),
        ]));
        for rest in body {
            all_lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(rest.to_string(), content_style),
            ]));
        }
    }

    let paragraph = Paragraph::new(Text::from(all_lines)).wrap(Wrap { trim: false });

    // scroll_offset counts lines up from the bottom
    let total_lines = paragraph.line_count(inner.width) as u16;
    let max_scroll = total_lines.saturating_sub(inner.height);
    if app.scroll_offset > max_scroll as usize {
        app.scroll_offset = max_scroll as usize;
    }
    let scroll_pos = max_scroll - app.scroll_offset as u16;

    app.scrollbar_state = ScrollbarState::new(max_scroll as usize).position(scroll_pos as usize);

    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("\u{25b2}"))
            .end_symbol(Some("\u{25bc}"))
            .track_symbol(Some("\u{2502}"))
            .thumb_symbol("\u{2588}"),
        area,
        &mut app.scrollbar_state,
    );

    frame.render_widget(paragraph.scroll((scroll_pos, 0)), inner);
}

// ── inputs ──────────────────────────────────────────────────────────────

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Blue)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_token(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Token;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(" JWT token ");

    let mut token = app.token_input.clone();
    token.set_block(block);
    if !focused {
        token.set_cursor_style(Style::default());
    }
    frame.render_widget(&token, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Message;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(" Message ");

    let mut textarea = app.textarea.clone();
    textarea.set_block(block);
    if !focused {
        textarea.set_cursor_style(Style::default());
    }
    frame.render_widget(&textarea, area);
}

// ── alert ───────────────────────────────────────────────────────────────

fn draw_alert(frame: &mut Frame, message: &str) {
    let area = centered(frame.area(), 50, 5);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Alert ");

    let text = Text::from(vec![
        Line::from(message.to_string()).bold(),
        Line::raw(""),
        Line::styled("Enter / Esc to dismiss", Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .centered()
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
