//! Chat log - the session's visible message history
//!
//! Lines are only ever appended; the log is unbounded for the lifetime of
//! the session and is cleared only on explicit request.

use chrono::{DateTime, Local};
use std::fmt;

/// Who a line is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    /// Locally generated lifecycle line
    System,
    /// The local user
    You,
    /// A decoded server reply
    Bot,
    /// A server frame that could not be decoded, shown verbatim
    BotRaw,
}

impl Sender {
    /// Label printed before the colon.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::You => "You",
            Self::Bot => "Bot",
            Self::BotRaw => "Bot (raw data)",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single line in the chat log.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    /// Attribution
    pub sender: Sender,
    /// Body; may span several lines
    pub text: String,
    /// When the line was appended
    pub timestamp: DateTime<Local>,
}

impl ChatLine {
    /// Create a line stamped with the current local time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    /// Shorthand for a system line.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text)
    }

    /// Shorthand for a line typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::You, text)
    }
}

impl fmt::Display for ChatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.text)
    }
}

/// Append-only list of chat lines.
#[derive(Debug, Default)]
pub struct ChatLog {
    lines: Vec<ChatLine>,
}

impl ChatLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `"{sender}: {text}"` to the end of the log.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> &ChatLine {
        self.push(ChatLine::new(sender, text))
    }

    /// Append an already built line.
    pub fn push(&mut self, line: ChatLine) -> &ChatLine {
        self.lines.push(line);
        &self.lines[self.lines.len() - 1]
    }

    /// All lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
