//! Outbound envelopes.
//!
//! Two mutually exclusive shapes share the socket: the credential handshake,
//! sent once right after the connection opens, and one chat envelope per
//! message the user sends.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A JSON object written to the socket as a single text frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// Credential handshake: `{"jwt_token": "..."}`
    Auth {
        /// Opaque token forwarded to the server
        jwt_token: String,
    },
    /// User message: `{"message": "..."}`
    Chat {
        /// Message text as typed
        message: String,
    },
}

impl Envelope {
    /// Build the credential handshake envelope.
    pub fn auth(token: impl Into<String>) -> Self {
        Self::Auth {
            jwt_token: token.into(),
        }
    }

    /// Build a chat message envelope.
    pub fn chat(message: impl Into<String>) -> Self {
        Self::Chat {
            message: message.into(),
        }
    }

    /// Serialize to the JSON text carried by the frame.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }
}
