//! WebSocket ("socket") ingestion.
//!
//! [`SocketTransport`] keeps one connection to `<base>/bots/ws` open,
//! reconnecting whenever it drops. The network side sits behind the
//! [`SocketConnector`] / [`SocketConnection`] seam; [`TungsteniteConnector`]
//! is the production implementation.

mod auth;
mod client;
mod connection;

pub use auth::{AuthConfig, SESSION_COOKIE_NAME};
pub use client::{
    CONNECT_RETRY_DELAY, ConnectionStatus, MAX_FRAME_SIZE, RECEIVE_PACING, SocketTransport,
    socket_endpoint,
};
pub use connection::{
    Frame, MAX_BUFFERED_MESSAGE, SocketConnection, SocketConnector, TungsteniteConnection, TungsteniteConnector,
};
