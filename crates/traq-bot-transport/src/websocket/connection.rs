//! The network seam under [`SocketTransport`](super::SocketTransport).

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, WebSocketConfig};
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_with_config};
use tracing::debug;
use traq_bot_core::{TransportError, TransportResult};
use url::Url;

use super::auth::AuthConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Largest message or frame the connection buffers, in bytes.
///
/// Text between [`MAX_FRAME_SIZE`](super::MAX_FRAME_SIZE) and this limit is
/// dropped by the transport. Anything larger fails the read and the
/// connection is replaced.
pub const MAX_BUFFERED_MESSAGE: usize = 1 << 20;

fn websocket_config() -> WebSocketConfig {
    WebSocketConfig::default()
        .max_message_size(Some(MAX_BUFFERED_MESSAGE))
        .max_frame_size(Some(MAX_BUFFERED_MESSAGE))
}

/// One complete message read from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text message.
    Text(String),
    /// A binary message.
    Binary(Vec<u8>),
    /// The peer started the closing handshake.
    Close(Option<String>),
    /// Ping, pong or a raw frame. Carries no event.
    Control,
}

/// An open duplex connection.
#[async_trait]
pub trait SocketConnection: Send {
    /// Reads the next message. `None` means the stream has ended.
    async fn receive(&mut self) -> Option<TransportResult<Frame>>;

    /// Sends a normal-closure close frame.
    async fn close(&mut self) -> TransportResult<()>;
}

/// Opens connections.
#[async_trait]
pub trait SocketConnector: Send + Sync {
    /// The connection type produced.
    type Connection: SocketConnection;

    /// Performs one handshake attempt.
    ///
    /// [`TransportError::ConnectionFailed`] marks a failure worth retrying.
    async fn connect(&self, endpoint: &Url, auth: &AuthConfig)
    -> TransportResult<Self::Connection>;
}

/// Connector over `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

/// A `tokio-tungstenite` connection.
pub struct TungsteniteConnection {
    stream: WsStream,
}

#[async_trait]
impl SocketConnector for TungsteniteConnector {
    type Connection = TungsteniteConnection;

    async fn connect(
        &self,
        endpoint: &Url,
        auth: &AuthConfig,
    ) -> TransportResult<TungsteniteConnection> {
        let mut request = endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;

        if let Some((name, value)) = auth.header_for(endpoint) {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| TransportError::InvalidConfig(format!("{name} header: {e}")))?;
            request.headers_mut().insert(name, value);
        }

        let (stream, response) =
            connect_async_with_config(request, Some(websocket_config()), false)
                .await
                .map_err(|e| TransportError::ConnectionFailed {
                    url: endpoint.to_string(),
                    reason: format!("WebSocket connection failed: {e}"),
                })?;
        debug!(status = %response.status(), "WebSocket handshake completed");

        Ok(TungsteniteConnection { stream })
    }
}

#[async_trait]
impl SocketConnection for TungsteniteConnection {
    async fn receive(&mut self) -> Option<TransportResult<Frame>> {
        let message = self.stream.next().await?;
        Some(match message {
            Ok(Message::Text(text)) => Ok(Frame::Text(text.as_str().to_owned())),
            Ok(Message::Binary(data)) => Ok(Frame::Binary(data.to_vec())),
            Ok(Message::Close(frame)) => Ok(Frame::Close(
                frame.map(|f| format!("{} {}", u16::from(f.code), f.reason)),
            )),
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => Ok(Frame::Control),
            Err(e) => Err(TransportError::Io(e.to_string())),
        })
    }

    async fn close(&mut self) -> TransportResult<()> {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: Utf8Bytes::from_static(""),
        };
        self.stream
            .close(Some(frame))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

impl std::fmt::Debug for TungsteniteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TungsteniteConnection").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_config_bounds_buffering() {
        let config = websocket_config();
        assert_eq!(config.max_message_size, Some(MAX_BUFFERED_MESSAGE));
        assert_eq!(config.max_frame_size, Some(MAX_BUFFERED_MESSAGE));
        assert!(MAX_BUFFERED_MESSAGE > super::super::MAX_FRAME_SIZE);
    }
}
