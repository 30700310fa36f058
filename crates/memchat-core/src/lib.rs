//! Memchat Core - wire types and rendering
//!
//! This crate holds everything in the chat client that does not touch a socket:
//! - envelope: outbound JSON envelopes (credential handshake, chat message)
//! - payload: one-shot tagged decode of inbound server payloads
//! - format: the display policy for decoded payloads
//! - chat_log: the session's append-only log of chat lines

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chat_log;
pub mod envelope;
pub mod error;
pub mod format;
pub mod payload;

pub use chat_log::{ChatLine, ChatLog, Sender};
pub use envelope::Envelope;
pub use error::{Error, Result, MESSAGE_NOT_SENT};
pub use payload::{Inbound, SnippetHit};
