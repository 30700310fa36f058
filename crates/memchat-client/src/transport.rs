//! Transport seam between the chat client and the socket.
//!
//! The client never touches a socket directly. A [`Connector`] opens a
//! connection, forwards inbound frames and lifecycle through an
//! [`InboundSink`], and hands back an [`Outbox`] for outbound frames.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use memchat_core::{Error, Result};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

/// Generation number of a connection. Events from older generations are stale.
pub type ConnectionId = u64;

/// Lifecycle and traffic of one connection, as seen by the client task.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// Socket is open and ready for writes
    Opened {
        /// Connection generation
        id: ConnectionId,
        /// Writer for outbound frames
        outbox: Outbox,
    },
    /// A text frame arrived
    Frame {
        /// Connection generation
        id: ConnectionId,
        /// Frame payload
        text: String,
    },
    /// The socket failed
    Errored {
        /// Connection generation
        id: ConnectionId,
        /// Failure description (for logs only)
        reason: String,
    },
    /// The socket is closed
    Closed {
        /// Connection generation
        id: ConnectionId,
    },
}

impl ConnectionEvent {
    /// Generation this event belongs to.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        match self {
            Self::Opened { id, .. }
            | Self::Frame { id, .. }
            | Self::Errored { id, .. }
            | Self::Closed { id } => *id,
        }
    }
}

/// Where a connector reports inbound traffic for one connection.
#[derive(Debug, Clone)]
pub struct InboundSink {
    id: ConnectionId,
    events: mpsc::UnboundedSender<ConnectionEvent>,
}

impl InboundSink {
    /// Create a sink tagging every event with `id`.
    #[must_use]
    pub fn new(id: ConnectionId, events: mpsc::UnboundedSender<ConnectionEvent>) -> Self {
        Self { id, events }
    }

    /// Generation of the connection this sink reports for.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Report an inbound text frame.
    pub fn frame(&self, text: impl Into<String>) {
        let _ = self.events.send(ConnectionEvent::Frame {
            id: self.id,
            text: text.into(),
        });
    }

    /// Report a socket failure.
    pub fn errored(&self, reason: impl Into<String>) {
        let _ = self.events.send(ConnectionEvent::Errored {
            id: self.id,
            reason: reason.into(),
        });
    }

    /// Report that the socket closed.
    pub fn closed(&self) {
        let _ = self.events.send(ConnectionEvent::Closed { id: self.id });
    }
}

/// Writer half of an open connection.
///
/// Dropping every clone closes the socket.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<String>,
}

impl Outbox {
    /// Create an outbox and the receiver a connector drains into its socket.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a text frame.
    pub fn send(&self, text: String) -> Result<()> {
        self.tx
            .send(text)
            .map_err(|_| Error::Send("socket writer has stopped".to_string()))
    }

    /// Whether the writer is still accepting frames.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Opens connections for the chat client.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a connection to `endpoint`.
    ///
    /// Once this returns `Ok`, the connector must report inbound frames and
    /// the eventual close through `inbound`. A failed open is reported through
    /// the returned error only.
    async fn open(&self, endpoint: &str, inbound: InboundSink) -> Result<Outbox>;
}

/// WebSocket connector backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Create a connector
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, endpoint: &str, inbound: InboundSink) -> Result<Outbox> {
        let (ws_stream, _) = connect_async(endpoint)
            .await
            .map_err(|e| Error::Connection(format!("failed to connect: {e}")))?;
        let (mut write, mut read) = ws_stream.split();
        let (outbox, mut outgoing) = Outbox::channel();
        let id = inbound.id();

        tokio::spawn(async move {
            while let Some(text) = outgoing.recv().await {
                if let Err(e) = write.send(Message::Text(text)).await {
                    warn!(connection = id, error = %e, "WebSocket write failed");
                    break;
                }
            }
            let _ = write.close().await;
            debug!(connection = id, "WebSocket writer stopped");
        });

        tokio::spawn(async move {
            while let Some(msg_result) = read.next().await {
                match msg_result {
                    Ok(Message::Text(text)) => inbound.frame(text),
                    Ok(Message::Binary(bytes)) => {
                        inbound.frame(String::from_utf8_lossy(&bytes).into_owned());
                    }
                    Ok(Message::Close(frame)) => {
                        debug!(connection = id, ?frame, "Server closed the connection");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        inbound.errored(e.to_string());
                        break;
                    }
                }
            }
            inbound.closed();
        });

        Ok(outbox)
    }
}
