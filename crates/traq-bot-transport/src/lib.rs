//! # traQ Bot Transport
//!
//! The two ways a traQ bot receives events, both exposed to the dispatch
//! loop as an [`EventSource`](traq_bot_core::EventSource).
//!
//! ## Features
//!
//! - `http-server`: axum webhook route feeding a [`PushTransport`]
//! - `ws-client`: [`SocketTransport`](websocket::SocketTransport) over tokio-tungstenite
//! - `full`: both
//!
//! [`PushTransport`] itself is always available; it only needs something to
//! call [`PushTransport::submit`].
//!
//! ## Architecture
//!
//! ```text
//!  traQ ── POST ──▶ push_router ──▶ PushTransport ──▶ HandoffQueue ─┐
//!                                                                    ├──▶ Bot
//!  traQ ◀── WebSocket ──────────────▶ SocketTransport ───────────────┘
//! ```

pub mod push;

#[cfg(feature = "http-server")]
pub mod http;

#[cfg(feature = "ws-client")]
pub mod websocket;

pub use push::{PushTransport, RejectReason, SubmitOutcome};

#[cfg(feature = "http-server")]
pub use http::{push_router, serve_push};

#[cfg(feature = "ws-client")]
pub use websocket::{AuthConfig, ConnectionStatus, SocketTransport};
