//! Chat client controller
//!
//! One task owns the connection state of a chat session. The UI drives it
//! through a [`ChatHandle`] and observes it through a stream of [`UiEvent`]s,
//! polled the same way the TUI drains responses from spawned work.
//!
//! Several clients can run side by side; each owns its own connection,
//! credential and retry timers.

use memchat_core::{format, ChatLine, Envelope, Error, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::transport::{
    ConnectionEvent, ConnectionId, Connector, InboundSink, Outbox, WsConnector,
};

/// System line appended when a connection opens.
pub const CONNECTED: &str = "Connected to chat";

/// System line appended when a connection closes.
pub const CONNECTION_CLOSED: &str = "Connection closed";

/// System line appended when a connection fails.
pub const CONNECTION_ERROR: &str = "Connection error";

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been attempted yet
    Unopened,
    /// Open in flight
    Connecting,
    /// Ready for writes
    Open,
    /// Closed by either side
    Closed,
    /// Failed
    Errored,
}

impl ConnectionState {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unopened => "unopened",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Errored => "errored",
        }
    }

    /// Whether a new connection may be started from this state.
    #[must_use]
    pub fn can_connect(&self) -> bool {
        matches!(self, Self::Unopened | Self::Closed | Self::Errored)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the client reports to its UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Append a line to the chat log
    Line(ChatLine),
    /// Show a blocking alert
    Alert(String),
    /// Show the message input
    InputRevealed,
    /// Connection state changed
    State(ConnectionState),
}

#[derive(Debug)]
enum Command {
    SetCredential(String),
    Connect,
    Send(String),
    Retry { text: String, attempt: u32 },
}

/// Handle to a running [`ChatClient`].
///
/// Dropping the handle shuts the client down, cancelling pending retries
/// and closing the connection.
#[derive(Debug)]
pub struct ChatHandle {
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
}

impl ChatHandle {
    /// Update the credential used by the next connect (the token field).
    pub fn set_credential(&self, credential: impl Into<String>) -> Result<()> {
        self.command(Command::SetCredential(credential.into()))
    }

    /// Open a connection with the current credential.
    ///
    /// An empty credential raises an alert and opens nothing.
    pub fn connect(&self) -> Result<()> {
        self.command(Command::Connect)
    }

    /// Send a message, connecting first if needed. Empty text is ignored.
    pub fn send_message(&self, text: impl Into<String>) -> Result<()> {
        self.command(Command::Send(text.into()))
    }

    /// Stop the client.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Whether the client task is still accepting commands.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.commands.is_closed()
    }

    fn command(&self, command: Command) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.commands.send(command).map_err(|_| Error::Cancelled)
    }
}

impl Drop for ChatHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owner of one chat session's connection.
pub struct ChatClient {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    state: ConnectionState,
    generation: ConnectionId,
    outbox: Option<Outbox>,
    /// Current value of the token field
    credential: String,
    /// Credential captured when the current connection was started
    handshake: String,
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    ui: mpsc::UnboundedSender<UiEvent>,
    cancel: CancellationToken,
}

impl ChatClient {
    /// Spawn a client using the WebSocket connector.
    #[must_use]
    pub fn spawn_ws(config: ClientConfig) -> (ChatHandle, mpsc::UnboundedReceiver<UiEvent>) {
        Self::spawn(config, Arc::new(WsConnector::new()))
    }

    /// Spawn a client with its own lifetime.
    #[must_use]
    pub fn spawn(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
    ) -> (ChatHandle, mpsc::UnboundedReceiver<UiEvent>) {
        Self::start(config, connector, CancellationToken::new())
    }

    /// Spawn a client that also stops when `parent` is cancelled.
    #[must_use]
    pub fn spawn_with_parent(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        parent: &CancellationToken,
    ) -> (ChatHandle, mpsc::UnboundedReceiver<UiEvent>) {
        Self::start(config, connector, parent.child_token())
    }

    fn start(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        cancel: CancellationToken,
    ) -> (ChatHandle, mpsc::UnboundedReceiver<UiEvent>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();

        let client = Self {
            config,
            connector,
            state: ConnectionState::Unopened,
            generation: 0,
            outbox: None,
            credential: String::new(),
            handshake: String::new(),
            commands: commands_tx.clone(),
            events: events_tx,
            ui: ui_tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(client.run(commands_rx, events_rx));

        (
            ChatHandle {
                commands: commands_tx,
                cancel,
            },
            ui_rx,
        )
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<ConnectionEvent>,
    ) {
        debug!(endpoint = %self.config.endpoint, "Chat client started");
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(event) = events.recv() => self.handle_event(event),
                Some(command) = commands.recv() => self.handle_command(command),
            }
        }

        self.outbox = None;
        debug!("Chat client stopped");
    }

    // ── commands ────────────────────────────────────────────────────────

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetCredential(credential) => self.credential = credential,
            Command::Connect => {
                self.connect();
            }
            Command::Send(text) => self.send_message(text),
            Command::Retry { text, attempt } => self.retry_send(text, attempt),
        }
    }

    /// Returns false when no connection is open or in flight afterwards.
    fn connect(&mut self) -> bool {
        if self.credential.is_empty() {
            debug!("Connect requested without a credential");
            self.emit(UiEvent::Alert(Error::MissingCredential.user_message()));
            return false;
        }
        if !self.state.can_connect() {
            debug!(state = %self.state, "Connect ignored, connection already active");
            return true;
        }
        self.start_connection();
        true
    }

    fn send_message(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if self.is_writable() {
            self.deliver(text, 0);
            return;
        }

        debug!(state = %self.state, "No open connection, connecting before send");
        if self.connect() {
            self.schedule_retry(text, 1);
        }
    }

    fn retry_send(&mut self, text: String, attempt: u32) {
        if self.is_writable() {
            debug!(attempt, "Delivering deferred message");
            self.deliver(text, attempt);
            return;
        }

        if attempt >= self.config.retry.max_attempts {
            let err = Error::RetriesExhausted { attempts: attempt };
            warn!(attempts = attempt, state = %self.state, "Dropping message, no open connection");
            self.system(err.user_message());
            return;
        }

        if self.state.can_connect() && !self.connect() {
            return;
        }
        self.schedule_retry(text, attempt + 1);
    }

    fn schedule_retry(&self, text: String, attempt: u32) {
        let delay = self.config.retry.delay_for(attempt);
        debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Scheduling send retry"
        );

        let commands = self.commands.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = commands.send(Command::Retry { text, attempt });
                }
            }
        });
    }

    /// Open with a live writer. The writer can stop before its close
    /// event has been handled.
    fn is_writable(&self) -> bool {
        self.state == ConnectionState::Open && self.outbox.as_ref().is_some_and(Outbox::is_open)
    }

    fn deliver(&mut self, text: String, attempt: u32) {
        let result = match &self.outbox {
            Some(outbox) => Envelope::chat(text.as_str())
                .to_json()
                .and_then(|json| outbox.send(json)),
            None => Err(Error::NotConnected),
        };

        match result {
            Ok(()) => self.emit(UiEvent::Line(ChatLine::user(text))),
            Err(e @ Error::Send(_)) => {
                debug!(error = %e, attempt, "Writer stopped, deferring message");
                self.outbox = None;
                self.retry_send(text, attempt);
            }
            Err(e) => {
                warn!(error = %e, "Failed to send message");
                self.system(e.user_message());
            }
        }
    }

    fn start_connection(&mut self) {
        self.generation += 1;
        let id = self.generation;
        self.handshake = self.credential.clone();
        self.outbox = None;
        self.set_state(ConnectionState::Connecting);
        info!(connection = id, endpoint = %self.config.endpoint, "Opening connection");

        let connector = Arc::clone(&self.connector);
        let endpoint = self.config.endpoint.clone();
        let events = self.events.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let inbound = InboundSink::new(id, events.clone());
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = connector.open(&endpoint, inbound) => match result {
                    Ok(outbox) => {
                        let _ = events.send(ConnectionEvent::Opened { id, outbox });
                    }
                    Err(e) => {
                        let _ = events.send(ConnectionEvent::Errored {
                            id,
                            reason: e.to_string(),
                        });
                        let _ = events.send(ConnectionEvent::Closed { id });
                    }
                }
            }
        });
    }

    // ── connection events ───────────────────────────────────────────────

    fn handle_event(&mut self, event: ConnectionEvent) {
        if event.id() != self.generation {
            debug!(
                connection = event.id(),
                current = self.generation,
                "Ignoring event from stale connection"
            );
            return;
        }

        match event {
            ConnectionEvent::Opened { id, outbox } => self.on_open(id, outbox),
            ConnectionEvent::Frame { text, .. } => {
                self.emit(UiEvent::Line(format::render_frame(&text)));
            }
            ConnectionEvent::Errored { id, reason } => {
                warn!(connection = id, reason = %reason, "Connection error");
                self.outbox = None;
                self.set_state(ConnectionState::Errored);
                self.system(CONNECTION_ERROR);
            }
            ConnectionEvent::Closed { id } => {
                info!(connection = id, "Connection closed");
                self.outbox = None;
                self.set_state(ConnectionState::Closed);
                self.system(CONNECTION_CLOSED);
            }
        }
    }

    fn on_open(&mut self, id: ConnectionId, outbox: Outbox) {
        if self.state != ConnectionState::Connecting {
            debug!(connection = id, state = %self.state, "Discarding late open");
            return;
        }
        info!(connection = id, endpoint = %self.config.endpoint, "Connection opened");

        if let Err(e) = Envelope::auth(self.handshake.as_str())
            .to_json()
            .and_then(|json| outbox.send(json))
        {
            warn!(connection = id, error = %e, "Failed to send credential envelope");
        }

        self.outbox = Some(outbox);
        self.set_state(ConnectionState::Open);
        self.system(CONNECTED);
        self.emit(UiEvent::InputRevealed);
    }

    // ── helpers ─────────────────────────────────────────────────────────

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            self.state = state;
            self.emit(UiEvent::State(state));
        }
    }

    fn system(&self, text: impl Into<String>) {
        self.emit(UiEvent::Line(ChatLine::system(text)));
    }

    fn emit(&self, event: UiEvent) {
        let _ = self.ui.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use async_trait::async_trait;
    use memchat_core::Sender;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Default)]
    struct FakeConnector {
        opens: AtomicU32,
        refuse: bool,
        open_delay: Duration,
        sinks: Mutex<Vec<InboundSink>>,
        outgoing: Mutex<Vec<mpsc::UnboundedReceiver<String>>>,
    }

    impl FakeConnector {
        fn refusing() -> Self {
            Self {
                refuse: true,
                ..Default::default()
            }
        }

        fn with_open_delay(open_delay: Duration) -> Self {
            Self {
                open_delay,
                ..Default::default()
            }
        }

        fn opens(&self) -> u32 {
            self.opens.load(Ordering::SeqCst)
        }

        fn sink(&self, index: usize) -> InboundSink {
            self.sinks.lock().unwrap()[index].clone()
        }

        /// Frames written to the given connection so far.
        fn sent(&self, index: usize) -> Vec<String> {
            let mut outgoing = self.outgoing.lock().unwrap();
            let mut frames = Vec::new();
            while let Ok(frame) = outgoing[index].try_recv() {
                frames.push(frame);
            }
            frames
        }

        /// Stop a connection's writer without reporting the close.
        fn drop_writer(&self, index: usize) {
            let (_tx, rx) = mpsc::unbounded_channel();
            self.outgoing.lock().unwrap()[index] = rx;
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        async fn open(&self, _endpoint: &str, inbound: InboundSink) -> Result<Outbox> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if !self.open_delay.is_zero() {
                tokio::time::sleep(self.open_delay).await;
            }
            if self.refuse {
                return Err(Error::Connection("connection refused".to_string()));
            }
            let (outbox, rx) = Outbox::channel();
            self.sinks.lock().unwrap().push(inbound);
            self.outgoing.lock().unwrap().push(rx);
            Ok(outbox)
        }
    }

    fn spawn_fake(
        connector: &Arc<FakeConnector>,
        config: ClientConfig,
    ) -> (ChatHandle, mpsc::UnboundedReceiver<UiEvent>) {
        ChatClient::spawn(config, Arc::clone(connector) as Arc<dyn Connector>)
    }

    async fn next_line(ui: &mut mpsc::UnboundedReceiver<UiEvent>) -> ChatLine {
        loop {
            match ui.recv().await.expect("client stopped") {
                UiEvent::Line(line) => return line,
                _ => continue,
            }
        }
    }

    async fn open_session(
        connector: &Arc<FakeConnector>,
    ) -> (ChatHandle, mpsc::UnboundedReceiver<UiEvent>) {
        let (handle, mut ui) = spawn_fake(connector, ClientConfig::default());
        handle.set_credential("tok").unwrap();
        handle.connect().unwrap();
        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connected to chat");
        (handle, ui)
    }

    #[tokio::test]
    async fn test_connect_without_credential_alerts() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = spawn_fake(&connector, ClientConfig::default());

        handle.connect().unwrap();
        assert_eq!(
            ui.recv().await.unwrap(),
            UiEvent::Alert("Enter JWT token".to_string())
        );

        assert_eq!(connector.opens(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_credential_is_forwarded() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = spawn_fake(&connector, ClientConfig::default());

        handle.set_credential("  ").unwrap();
        handle.connect().unwrap();
        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connected to chat");
        assert_eq!(connector.sent(0), vec![r#"{"jwt_token":"  "}"#.to_string()]);
    }

    #[tokio::test]
    async fn test_connect_sends_handshake_and_reveals_input() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = spawn_fake(&connector, ClientConfig::default());

        handle.set_credential("header.payload.sig").unwrap();
        handle.connect().unwrap();

        assert_eq!(
            ui.recv().await.unwrap(),
            UiEvent::State(ConnectionState::Connecting)
        );
        assert_eq!(ui.recv().await.unwrap(), UiEvent::State(ConnectionState::Open));
        match ui.recv().await.unwrap() {
            UiEvent::Line(line) => assert_eq!(line.to_string(), "System: Connected to chat"),
            other => panic!("expected line, got {other:?}"),
        }
        assert_eq!(ui.recv().await.unwrap(), UiEvent::InputRevealed);

        assert_eq!(
            connector.sent(0),
            vec![r#"{"jwt_token":"header.payload.sig"}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_connect_while_open_is_ignored() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = open_session(&connector).await;

        handle.connect().unwrap();
        handle.send_message("ping").unwrap();
        assert_eq!(next_line(&mut ui).await.to_string(), "You: ping");
        assert_eq!(connector.opens(), 1);
    }

    #[tokio::test]
    async fn test_inbound_frames_are_rendered() {
        let connector = Arc::new(FakeConnector::default());
        let (_handle, mut ui) = open_session(&connector).await;
        let sink = connector.sink(0);

        sink.frame(r#"{"error":"x"}"#);
        assert_eq!(next_line(&mut ui).await.to_string(), "Bot: Error - x");

        sink.frame("[]");
        assert_eq!(
            next_line(&mut ui).await.to_string(),
            "Bot: I found no specific snippets for your query in the email data."
        );

        sink.frame("{bad");
        let line = next_line(&mut ui).await;
        assert_eq!(line.sender, Sender::BotRaw);
        assert!(line.to_string().starts_with("Bot (raw data): {bad"));

        // the client is still alive after a malformed frame
        sink.frame(r#"{"reply":"still here"}"#);
        assert_eq!(next_line(&mut ui).await.to_string(), "Bot: still here");
    }

    #[tokio::test]
    async fn test_error_and_close_lines() {
        let connector = Arc::new(FakeConnector::default());
        let (_handle, mut ui) = open_session(&connector).await;
        let sink = connector.sink(0);

        sink.errored("connection reset");
        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connection error");

        sink.closed();
        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connection closed");
    }

    #[tokio::test]
    async fn test_send_when_open_delivers_immediately() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = open_session(&connector).await;

        handle.send_message("").unwrap();
        handle.send_message("who emailed me about invoices?").unwrap();
        assert_eq!(
            next_line(&mut ui).await.to_string(),
            "You: who emailed me about invoices?"
        );

        assert_eq!(
            connector.sent(0),
            vec![
                r#"{"jwt_token":"tok"}"#.to_string(),
                r#"{"message":"who emailed me about invoices?"}"#.to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_while_disconnected_connects_once_and_retries_once() {
        let connector = Arc::new(FakeConnector::with_open_delay(Duration::from_millis(100)));
        let (handle, mut ui) = spawn_fake(&connector, ClientConfig::default());
        let started = Instant::now();

        handle.set_credential("tok").unwrap();
        handle.send_message("hello").unwrap();

        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connected to chat");
        assert_eq!(next_line(&mut ui).await.to_string(), "You: hello");

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500), "sent after {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1_000), "sent after {elapsed:?}");

        assert_eq!(connector.opens(), 1);
        assert_eq!(
            connector.sent(0),
            vec![
                r#"{"jwt_token":"tok"}"#.to_string(),
                r#"{"message":"hello"}"#.to_string(),
            ]
        );

        // nothing else is retried later
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(connector.sent(0).is_empty());
        assert_eq!(connector.opens(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_after_writer_stopped_waits_for_reconnect() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = open_session(&connector).await;
        connector.sent(0);

        connector.drop_writer(0);
        handle.send_message("hello").unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        connector.sink(0).closed();
        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connection closed");
        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connected to chat");
        assert_eq!(next_line(&mut ui).await.to_string(), "You: hello");

        assert_eq!(connector.opens(), 2);
        assert_eq!(
            connector.sent(1),
            vec![
                r#"{"jwt_token":"tok"}"#.to_string(),
                r#"{"message":"hello"}"#.to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_without_credential_alerts_and_drops() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = spawn_fake(&connector, ClientConfig::default());

        handle.send_message("hello").unwrap();
        assert_eq!(
            ui.recv().await.unwrap(),
            UiEvent::Alert("Enter JWT token".to_string())
        );

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(ui.try_recv().is_err());
        assert_eq!(connector.opens(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_bounded() {
        let connector = Arc::new(FakeConnector::refusing());
        let config =
            ClientConfig::default().with_retry(RetryConfig::default().with_max_attempts(3));
        let (handle, mut ui) = spawn_fake(&connector, config);
        let started = Instant::now();

        handle.set_credential("tok").unwrap();
        handle.send_message("lost").unwrap();

        let mut errors = 0;
        loop {
            let line = next_line(&mut ui).await;
            match line.text.as_str() {
                CONNECTION_ERROR => errors += 1,
                CONNECTION_CLOSED => {}
                memchat_core::MESSAGE_NOT_SENT => break,
                other => panic!("unexpected line: {other}"),
            }
        }

        // 500ms + 1s + 2s
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3_500), "gave up after {elapsed:?}");
        assert!(elapsed < Duration::from_millis(4_000), "gave up after {elapsed:?}");
        assert_eq!(errors, 3);
        assert_eq!(connector.opens(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_retry() {
        let connector = Arc::new(FakeConnector::with_open_delay(Duration::from_secs(3_600)));
        let (handle, mut ui) = spawn_fake(&connector, ClientConfig::default());

        handle.set_credential("tok").unwrap();
        handle.send_message("never").unwrap();
        assert_eq!(
            ui.recv().await.unwrap(),
            UiEvent::State(ConnectionState::Connecting)
        );

        handle.shutdown();
        assert!(matches!(handle.send_message("late"), Err(Error::Cancelled)));

        while let Some(event) = ui.recv().await {
            if let UiEvent::Line(line) = event {
                panic!("no lines expected after shutdown, got {line}");
            }
        }
        assert_eq!(connector.opens(), 1);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_client() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = open_session(&connector).await;

        drop(handle);
        while ui.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn test_parent_token_stops_client() {
        let connector = Arc::new(FakeConnector::default());
        let parent = CancellationToken::new();
        let (handle, mut ui) = ChatClient::spawn_with_parent(
            ClientConfig::default(),
            Arc::clone(&connector) as Arc<dyn Connector>,
            &parent,
        );

        parent.cancel();
        while ui.recv().await.is_some() {}
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_stale_connection_events_are_ignored() {
        let connector = Arc::new(FakeConnector::default());
        let (handle, mut ui) = open_session(&connector).await;

        connector.sink(0).closed();
        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connection closed");

        handle.connect().unwrap();
        assert_eq!(next_line(&mut ui).await.to_string(), "System: Connected to chat");

        connector.sink(0).frame(r#""from the old socket""#);
        connector.sink(1).frame(r#""from the new socket""#);
        assert_eq!(
            next_line(&mut ui).await.to_string(),
            "Bot: from the new socket"
        );
        assert_eq!(connector.opens(), 2);
    }

    #[tokio::test]
    async fn test_independent_clients() {
        let first = Arc::new(FakeConnector::default());
        let second = Arc::new(FakeConnector::default());
        let (_a, mut ui_a) = open_session(&first).await;
        let (_b, mut ui_b) = open_session(&second).await;

        first.sink(0).frame(r#""for a""#);
        second.sink(0).frame(r#""for b""#);

        assert_eq!(next_line(&mut ui_a).await.to_string(), "Bot: for a");
        assert_eq!(next_line(&mut ui_b).await.to_string(), "Bot: for b");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert!(ConnectionState::Errored.can_connect());
        assert!(!ConnectionState::Open.can_connect());
    }
}
