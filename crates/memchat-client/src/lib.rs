//! Memchat Client - the chat client controller
//!
//! This crate owns the network side of the chat widget:
//! - transport: the `Connector` seam and its WebSocket implementation
//! - client: the controller task that owns one connection at a time
//! - retry: backoff schedule for sends issued while disconnected
//! - config: endpoint and retry settings

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod retry;
pub mod transport;

pub use client::{ChatClient, ChatHandle, ConnectionState, UiEvent};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use retry::RetryConfig;
pub use transport::{ConnectionEvent, ConnectionId, Connector, InboundSink, Outbox, WsConnector};
