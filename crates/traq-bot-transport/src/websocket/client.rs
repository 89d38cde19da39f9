//! Persistent WebSocket event source.
//!
//! ```text
//!            connect ok              close / stream end / I/O error
//! Disconnected ──▶ Connecting ──▶ Open ─────────────────────────────▶ Disconnected
//!                   │    ▲
//!                   └────┘ connect failed: wait CONNECT_RETRY_DELAY
//! ```
//!
//! Every receive cycle runs alongside a [`RECEIVE_PACING`] timer and the next
//! cycle starts only once both are done, so frames that yield no event are
//! consumed at most about twice a second.
//!
//! Per received message:
//!
//! | message                           | action                              |
//! |-----------------------------------|-------------------------------------|
//! | close                             | close output side, reconnect next   |
//! | binary                            | dropped                             |
//! | text longer than [`MAX_FRAME_SIZE`] | dropped                           |
//! | empty text, ping, pong            | ignored                             |
//! | text                              | parsed into an [`Envelope`]         |

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};
use traq_bot_core::{Envelope, EventSource, TransportError, TransportResult};
use url::Url;

use super::auth::AuthConfig;
use super::connection::{Frame, SocketConnection, SocketConnector, TungsteniteConnector};

/// Largest accepted text message, in bytes.
///
/// Checked after the connection has assembled the whole message, so the
/// memory bound is [`MAX_BUFFERED_MESSAGE`](super::MAX_BUFFERED_MESSAGE).
pub const MAX_FRAME_SIZE: usize = 1 << 16;

/// Minimum duration of one receive cycle.
pub const RECEIVE_PACING: Duration = Duration::from_millis(500);

/// Delay between failed connection attempts.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Upper bound on waiting for the closing handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the bot socket endpoint, relative to the API base.
const ENDPOINT_PATH: &str = "bots/ws";

/// Builds the socket endpoint from an API base URL.
///
/// `http` maps to `ws` and `https` to `wss`; the endpoint path is appended to
/// the base path.
pub fn socket_endpoint(base_url: &Url) -> TransportResult<Url> {
    let scheme = match base_url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(TransportError::InvalidConfig(format!(
                "unsupported base URL scheme: {other}"
            )));
        }
    };

    let mut endpoint = base_url.clone();
    endpoint
        .set_scheme(scheme)
        .map_err(|()| TransportError::InvalidConfig(format!("cannot use scheme {scheme}")))?;
    let path = format!("{}/{ENDPOINT_PATH}", base_url.path().trim_end_matches('/'));
    endpoint.set_path(&path);
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    Ok(endpoint)
}

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No connection.
    Disconnected,
    /// A handshake, or the wait before the next one, is in progress.
    Connecting,
    /// Connected.
    Open,
}

enum ConnectionState<C> {
    Disconnected,
    Connecting,
    Open(C),
}

/// Event source reading from the platform's bot WebSocket.
pub struct SocketTransport<C: SocketConnector = TungsteniteConnector> {
    connector: C,
    endpoint: Url,
    auth: AuthConfig,
    state: ConnectionState<C::Connection>,
}

impl SocketTransport<TungsteniteConnector> {
    /// Creates a transport for the API at `base_url`.
    pub fn new(base_url: &str, auth: AuthConfig) -> TransportResult<Self> {
        Self::with_connector(TungsteniteConnector, base_url, auth)
    }
}

impl<C: SocketConnector> SocketTransport<C> {
    /// Creates a transport that opens connections through `connector`.
    pub fn with_connector(connector: C, base_url: &str, auth: AuthConfig) -> TransportResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidConfig(format!("invalid base URL: {e}")))?;
        Ok(Self {
            connector,
            endpoint: socket_endpoint(&base)?,
            auth,
            state: ConnectionState::Disconnected,
        })
    }

    /// Returns the socket endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the current connection state.
    pub fn status(&self) -> ConnectionStatus {
        match self.state {
            ConnectionState::Disconnected => ConnectionStatus::Disconnected,
            ConnectionState::Connecting => ConnectionStatus::Connecting,
            ConnectionState::Open(_) => ConnectionStatus::Open,
        }
    }

    /// Returns the open connection, connecting first if needed.
    async fn ensure_open(&mut self, cancel: &CancellationToken) -> TransportResult<&mut C::Connection> {
        if !matches!(self.state, ConnectionState::Open(_)) {
            self.state = ConnectionState::Connecting;
            match connect_with_retry(&self.connector, &self.endpoint, &self.auth, cancel).await {
                Ok(conn) => self.state = ConnectionState::Open(conn),
                Err(e) => {
                    self.state = ConnectionState::Disconnected;
                    return Err(e);
                }
            }
        }

        match &mut self.state {
            ConnectionState::Open(conn) => Ok(conn),
            _ => Err(TransportError::Io("connection is not open".into())),
        }
    }

    /// Drops the connection after sending a close frame, bounded by
    /// [`CLOSE_TIMEOUT`].
    async fn disconnect(&mut self) {
        let state = std::mem::replace(&mut self.state, ConnectionState::Disconnected);
        if let ConnectionState::Open(mut conn) = state {
            match tokio::time::timeout(CLOSE_TIMEOUT, conn.close()).await {
                Ok(Ok(())) => trace!("WebSocket closed"),
                Ok(Err(e)) => trace!(error = %e, "WebSocket close failed"),
                Err(_) => warn!("Timed out closing WebSocket"),
            }
        }
    }

    /// One receive-and-decode cycle. `Ok(None)` means no event this cycle.
    async fn receive_cycle(&mut self, cancel: &CancellationToken) -> TransportResult<Option<Envelope>> {
        let conn = self.ensure_open(cancel).await?;

        let received = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TransportError::Cancelled),
            received = conn.receive() => received,
        };

        match received {
            None => {
                warn!(url = %self.endpoint, "WebSocket stream ended");
                self.state = ConnectionState::Disconnected;
                Ok(None)
            }
            Some(Err(e)) => {
                error!(url = %self.endpoint, error = %e, "Failed to receive a WebSocket message");
                self.state = ConnectionState::Disconnected;
                Ok(None)
            }
            Some(Ok(Frame::Close(reason))) => {
                warn!(reason = ?reason, "WebSocket connection was closed");
                tokio::select! {
                    () = cancel.cancelled() => {}
                    () = self.disconnect() => {}
                }
                Ok(None)
            }
            Some(Ok(Frame::Binary(data))) => {
                warn!(len = data.len(), "Binary message is not supported, ignoring");
                Ok(None)
            }
            Some(Ok(Frame::Control)) => Ok(None),
            Some(Ok(Frame::Text(text))) if text.len() > MAX_FRAME_SIZE => {
                warn!(
                    len = text.len(),
                    limit = MAX_FRAME_SIZE,
                    "Received too long message, ignoring"
                );
                Ok(None)
            }
            Some(Ok(Frame::Text(text))) if text.is_empty() => Ok(None),
            Some(Ok(Frame::Text(text))) => {
                trace!(len = text.len(), "Received text message");
                Envelope::from_frame(&text).map(Some)
            }
        }
    }
}

/// Attempts the handshake until it succeeds or `cancel` fires.
///
/// Borrows only what the handshake needs, so the open connection is never
/// shared across the await.
async fn connect_with_retry<C: SocketConnector>(
    connector: &C,
    endpoint: &Url,
    auth: &AuthConfig,
    cancel: &CancellationToken,
) -> TransportResult<C::Connection> {
    loop {
        let attempt = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TransportError::Cancelled),
            attempt = connector.connect(endpoint, auth) => attempt,
        };

        match attempt {
            Ok(conn) => {
                info!(url = %endpoint, "Connected to WebSocket server");
                return Ok(conn);
            }
            Err(e @ (TransportError::ConnectionFailed { .. } | TransportError::Io(_))) => {
                error!(
                    url = %endpoint,
                    error = %e,
                    delay = ?CONNECT_RETRY_DELAY,
                    "Failed to connect to WebSocket server, retrying"
                );
                tokio::select! {
                    () = cancel.cancelled() => return Err(TransportError::Cancelled),
                    () = tokio::time::sleep(CONNECT_RETRY_DELAY) => {}
                }
            }
            Err(e) => return Err(e),
        }
    }
}

async fn pace(cancel: &CancellationToken) {
    tokio::select! {
        () = cancel.cancelled() => {}
        () = tokio::time::sleep(RECEIVE_PACING) => {}
    }
}

#[async_trait]
impl<C> EventSource for SocketTransport<C>
where
    C: SocketConnector,
{
    async fn initialize(&mut self, cancel: &CancellationToken) -> TransportResult<()> {
        self.ensure_open(cancel).await.map(|_| ())
    }

    async fn next_event(&mut self, cancel: &CancellationToken) -> TransportResult<Envelope> {
        while !cancel.is_cancelled() {
            let (received, ()) = tokio::join!(self.receive_cycle(cancel), pace(cancel));
            if let Some(envelope) = received? {
                return Ok(envelope);
            }
        }
        Err(TransportError::Cancelled)
    }

    async fn shutdown(&mut self) {
        if matches!(self.state, ConnectionState::Open(_)) {
            info!(url = %self.endpoint, "Closing WebSocket connection");
        }
        self.disconnect().await;
    }
}

impl<C: SocketConnector> std::fmt::Debug for SocketTransport<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("auth", &self.auth)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    const BASE: &str = "https://q.trap.jp/api/v3";

    /// Plays back frames, then blocks forever.
    struct ScriptedConnection {
        frames: VecDeque<TransportResult<Frame>>,
        closed: Arc<AtomicBool>,
        hang_on_close: bool,
    }

    #[async_trait]
    impl SocketConnection for ScriptedConnection {
        async fn receive(&mut self) -> Option<TransportResult<Frame>> {
            match self.frames.pop_front() {
                Some(frame) => Some(frame),
                None => futures::future::pending().await,
            }
        }

        async fn close(&mut self) -> TransportResult<()> {
            if self.hang_on_close {
                futures::future::pending::<()>().await;
            }
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Each attempt takes the next scripted connection, or fails. When the
    /// script runs out it fails and fires `on_exhausted`.
    struct ScriptedConnector {
        attempts: Mutex<VecDeque<Option<Vec<TransportResult<Frame>>>>>,
        connects: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
        on_exhausted: Option<CancellationToken>,
        hang_on_close: bool,
    }

    impl ScriptedConnector {
        fn new(attempts: Vec<Option<Vec<TransportResult<Frame>>>>) -> Self {
            Self {
                attempts: Mutex::new(attempts.into()),
                connects: Arc::new(AtomicUsize::new(0)),
                closed: Arc::new(AtomicBool::new(false)),
                on_exhausted: None,
                hang_on_close: false,
            }
        }
    }

    #[async_trait]
    impl SocketConnector for ScriptedConnector {
        type Connection = ScriptedConnection;

        async fn connect(
            &self,
            endpoint: &Url,
            _auth: &AuthConfig,
        ) -> TransportResult<ScriptedConnection> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let next = self.attempts.lock().unwrap().pop_front();
            match next {
                Some(Some(frames)) => Ok(ScriptedConnection {
                    frames: frames.into(),
                    closed: Arc::clone(&self.closed),
                    hang_on_close: self.hang_on_close,
                }),
                Some(None) => Err(TransportError::ConnectionFailed {
                    url: endpoint.to_string(),
                    reason: "refused".into(),
                }),
                None => {
                    if let Some(token) = &self.on_exhausted {
                        token.cancel();
                    }
                    Err(TransportError::ConnectionFailed {
                        url: endpoint.to_string(),
                        reason: "unreachable".into(),
                    })
                }
            }
        }
    }

    /// A connection that is `Send` but not `Sync`.
    struct UnsyncConnection {
        reads: std::cell::Cell<usize>,
    }

    #[async_trait]
    impl SocketConnection for UnsyncConnection {
        async fn receive(&mut self) -> Option<TransportResult<Frame>> {
            self.reads.set(self.reads.get() + 1);
            Some(text(PING_NO_REQ))
        }

        async fn close(&mut self) -> TransportResult<()> {
            Ok(())
        }
    }

    struct UnsyncConnector;

    #[async_trait]
    impl SocketConnector for UnsyncConnector {
        type Connection = UnsyncConnection;

        async fn connect(
            &self,
            _endpoint: &Url,
            _auth: &AuthConfig,
        ) -> TransportResult<UnsyncConnection> {
            Ok(UnsyncConnection {
                reads: std::cell::Cell::new(0),
            })
        }
    }

    fn text(s: &str) -> TransportResult<Frame> {
        Ok(Frame::Text(s.to_owned()))
    }

    const PING_NO_REQ: &str = r#"{"type":"PING","body":{"eventTime":"2019-05-08T13:33:51.690308239Z"}}"#;

    fn transport(connector: ScriptedConnector) -> SocketTransport<ScriptedConnector> {
        SocketTransport::with_connector(connector, BASE, AuthConfig::bearer("token")).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_need_not_be_sync() {
        let transport =
            SocketTransport::with_connector(UnsyncConnector, BASE, AuthConfig::bearer("token"))
                .unwrap();
        let mut source: Box<dyn EventSource> = Box::new(transport);

        let envelope = source.next_event(&CancellationToken::new()).await.unwrap();
        assert_eq!(envelope.event_name(), "PING");
        source.shutdown().await;
    }

    #[test]
    fn test_socket_endpoint() {
        let endpoint = |s: &str| socket_endpoint(&Url::parse(s).unwrap()).map(|u| u.to_string());

        assert_eq!(
            endpoint("https://q.trap.jp/api/v3").unwrap(),
            "wss://q.trap.jp/api/v3/bots/ws"
        );
        assert_eq!(
            endpoint("http://localhost:3000/api/v3/").unwrap(),
            "ws://localhost:3000/api/v3/bots/ws"
        );
        assert_eq!(endpoint("https://q.trap.jp").unwrap(), "wss://q.trap.jp/bots/ws");
        assert!(endpoint("ftp://q.trap.jp").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnects_after_close() {
        let connector = ScriptedConnector::new(vec![
            Some(vec![
                text(r#"{"type":"JOIN","reqId":"r1","body":{"channel":"x"}}"#),
                Ok(Frame::Close(Some("1000 bye".into()))),
            ]),
            Some(vec![text(PING_NO_REQ)]),
        ]);
        let connects = Arc::clone(&connector.connects);
        let closed = Arc::clone(&connector.closed);
        let mut transport = transport(connector);
        let cancel = CancellationToken::new();

        let join = transport.next_event(&cancel).await.unwrap();
        assert_eq!(join.event_name(), "JOIN");
        assert_eq!(join.request_id(), Some("r1"));
        assert_eq!(transport.status(), ConnectionStatus::Open);

        let ping = transport.next_event(&cancel).await.unwrap();
        assert_eq!(ping.event_name(), "PING");
        assert_eq!(ping.request_id(), None);

        assert_eq!(connects.load(Ordering::SeqCst), 2);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_frame_is_dropped() {
        let oversized = format!(
            r#"{{"type":"PING","reqId":"big","body":{{"pad":"{}"}}}}"#,
            "x".repeat(MAX_FRAME_SIZE)
        );
        let connector = ScriptedConnector::new(vec![Some(vec![
            text(&oversized),
            text(r#"{"type":"PING","reqId":"small","body":{}}"#),
        ])]);
        let connects = Arc::clone(&connector.connects);
        let mut transport = transport(connector);

        let envelope = transport
            .next_event(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(envelope.request_id(), Some("small"));
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(transport.status(), ConnectionStatus::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_event_frames_are_skipped_at_paced_rate() {
        let connector = ScriptedConnector::new(vec![Some(vec![
            Ok(Frame::Binary(vec![1, 2, 3])),
            Ok(Frame::Control),
            text(""),
            text(PING_NO_REQ),
        ])]);
        let connects = Arc::clone(&connector.connects);
        let mut transport = transport(connector);
        let started = Instant::now();

        let envelope = transport
            .next_event(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(envelope.event_name(), "PING");
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        // Four cycles of at least RECEIVE_PACING each.
        assert!(started.elapsed() >= RECEIVE_PACING * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_receive_error_reconnects() {
        let connector = ScriptedConnector::new(vec![
            Some(vec![Err(TransportError::Io("connection reset".into()))]),
            Some(vec![text(PING_NO_REQ)]),
        ]);
        let connects = Arc::clone(&connector.connects);
        let mut transport = transport(connector);

        let envelope = transport
            .next_event(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(envelope.event_name(), "PING");
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_failure_retries_after_fixed_delay() {
        let connector = ScriptedConnector::new(vec![None, None, Some(vec![text(PING_NO_REQ)])]);
        let connects = Arc::clone(&connector.connects);
        let mut transport = transport(connector);
        let started = Instant::now();

        let envelope = transport
            .next_event(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(envelope.event_name(), "PING");
        assert_eq!(connects.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= CONNECT_RETRY_DELAY * 2);
        assert!(started.elapsed() < CONNECT_RETRY_DELAY * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_connect_failure_is_never_fatal() {
        let cancel = CancellationToken::new();
        let mut connector = ScriptedConnector::new((0..10).map(|_| None).collect());
        connector.on_exhausted = Some(cancel.clone());
        let connects = Arc::clone(&connector.connects);
        let mut transport = transport(connector);

        let err = transport.next_event(&cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(connects.load(Ordering::SeqCst), 11);
        assert_eq!(transport.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_frame_is_fatal() {
        let connector = ScriptedConnector::new(vec![Some(vec![text(r#"{"type":"PING"}"#)])]);
        let mut transport = transport(connector);

        let err = transport
            .next_event(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::MalformedFrame { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_receiving() {
        let connector = ScriptedConnector::new(vec![Some(vec![])]);
        let mut transport = transport(connector);
        let cancel = CancellationToken::new();

        transport.initialize(&cancel).await.unwrap();
        assert_eq!(transport.status(), ConnectionStatus::Open);

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                cancel.cancel();
            })
        };
        let err = transport.next_event(&cancel).await.unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_close_after_close_frame() {
        let mut connector =
            ScriptedConnector::new(vec![Some(vec![Ok(Frame::Close(None))])]);
        connector.hang_on_close = true;
        let mut transport = transport(connector);
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                cancel.cancel();
            })
        };
        let err = transport.next_event(&cancel).await.unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
        assert!(started.elapsed() < CLOSE_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_sends_close() {
        let connector = ScriptedConnector::new(vec![Some(vec![])]);
        let closed = Arc::clone(&connector.closed);
        let mut transport = transport(connector);

        // Never connected: nothing to close.
        transport.shutdown().await;
        assert!(!closed.load(Ordering::SeqCst));

        transport.initialize(&CancellationToken::new()).await.unwrap();
        transport.shutdown().await;
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(transport.status(), ConnectionStatus::Disconnected);

        transport.shutdown().await;
    }
}
