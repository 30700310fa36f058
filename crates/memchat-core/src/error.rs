//! Error types for memchat-core
//!
//! Shared by the client crate so that every failure in the chat pipeline
//! can be turned into a line in the chat log.

use thiserror::Error;

/// System line shown when a message is dropped for lack of a connection.
pub const MESSAGE_NOT_SENT: &str = "Message not sent: connection unavailable";

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Connect was requested while the token field is empty
    #[error("missing credential")]
    MissingCredential,

    /// No open connection to write to
    #[error("not connected")]
    NotConnected,

    /// Socket could not be opened or failed while open
    #[error("connection error: {0}")]
    Connection(String),

    /// Frame could not be handed to the socket writer
    #[error("send error: {0}")]
    Send(String),

    /// Outbound envelope could not be serialized
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Inbound frame is not valid JSON
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Message dropped after the retry budget ran out
    #[error("message not sent after {attempts} attempts")]
    RetriesExhausted {
        /// Number of delivery attempts made
        attempts: u32,
    },

    /// The client was shut down
    #[error("client shut down")]
    Cancelled,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Text shown to the user when this error surfaces in the UI.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingCredential => "Enter JWT token".to_string(),
            Error::NotConnected | Error::Connection(_) => "Connection error".to_string(),
            Error::RetriesExhausted { .. } => MESSAGE_NOT_SENT.to_string(),
            Error::Cancelled => "Chat client stopped".to_string(),
            other => other.to_string(),
        }
    }
}
