//! Display policy for inbound payloads.
//!
//! Turns a decoded [`Inbound`] into the body of a `Bot` line. Frames that
//! fail to decode are shown verbatim under the `Bot (raw data)` sender.

use std::fmt::Write;

use tracing::{error, warn};

use crate::chat_log::{ChatLine, Sender};
use crate::payload::{Inbound, SnippetHit};

/// Maximum number of characters shown per snippet preview.
pub const PREVIEW_LIMIT: usize = 300;

/// Marker appended to a truncated preview.
pub const ELLIPSIS: &str = "...";

/// Header line for a non-empty snippet list.
pub const SNIPPETS_HEADER: &str = "Found these relevant snippets:";

/// Body shown for an empty snippet list.
pub const NO_SNIPPETS: &str = "I found no specific snippets for your query in the email data.";

/// Preview shown for a hit with neither `memory` nor `text`.
pub const NO_PREVIEW: &str = "No content preview available.";

/// Body shown for JSON of an unrecognized shape.
pub const UNEXPECTED_FORMAT: &str = "Received an unexpected data format.";

/// Body text for a decoded payload (without the sender prefix).
#[must_use]
pub fn render(payload: &Inbound) -> String {
    match payload {
        Inbound::Error(message) => format!("Error - {message}"),
        Inbound::SnippetList(hits) if hits.is_empty() => NO_SNIPPETS.to_string(),
        Inbound::SnippetList(hits) => render_snippets(hits),
        Inbound::PlainReply(text) => text.clone(),
        Inbound::Unrecognized(_) => UNEXPECTED_FORMAT.to_string(),
    }
}

/// A `Bot` line for a decoded payload.
#[must_use]
pub fn render_line(payload: &Inbound) -> ChatLine {
    ChatLine::new(Sender::Bot, render(payload))
}

/// Decode a raw frame and render it, falling back to the raw text.
///
/// Never fails: undecodable frames become a `Bot (raw data)` line and the
/// decode error is logged.
#[must_use]
pub fn render_frame(raw: &str) -> ChatLine {
    match Inbound::decode(raw) {
        Ok(payload) => {
            if let Inbound::Unrecognized(value) = &payload {
                warn!(payload = %value, "Unexpected data format from server");
            }
            render_line(&payload)
        }
        Err(e) => {
            error!(error = %e, raw = %raw, "Failed to decode message from server");
            ChatLine::new(Sender::BotRaw, raw)
        }
    }
}

fn render_snippets(hits: &[SnippetHit]) -> String {
    let mut out = String::from(SNIPPETS_HEADER);
    for (index, hit) in hits.iter().enumerate() {
        let content = hit.content().unwrap_or(NO_PREVIEW);
        let _ = write!(out, "\n\n[{}] {}", index + 1, preview(content));
        if let Some(score) = hit.score {
            let _ = write!(out, "\n   (Score: {:.4})", round_score(score));
        }
    }
    out
}

/// Ties round away from zero; `{:.4}` alone rounds them to even.
fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let mut head: String = chars.by_ref().take(PREVIEW_LIMIT).collect();
    if chars.next().is_some() {
        head.push_str(ELLIPSIS);
    }
    head
}
