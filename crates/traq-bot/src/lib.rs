//! # traq-bot
//!
//! An event pump for traQ bots. Events arrive either as webhook POSTs or over
//! a long-lived WebSocket; both feed the same dispatch loop, which decodes
//! each event and awaits its handler before taking the next one.
//!
//! ## Architecture
//!
//! ```text
//!  traQ ── POST ──▶ webhook listener ──▶ PushTransport ──▶ HandoffQueue ─┐
//!                                                                         ├──▶ Bot ──▶ EventRouter ──▶ handler
//!  traQ ◀── WebSocket ──▶ SocketTransport ────────────────────────────────┘
//! ```
//!
//! - **Runtime**: loads configuration, sets up logging, opens the transport
//! - **Transports**: the webhook path verifies `X-TRAQ-BOT-TOKEN`; the socket
//!   path reconnects after drops and paces receives
//! - **Router**: one typed handler slot per event name
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use traq_bot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = EventRouter::builder()
//!         .on_message_created(|event, _cancel| async move {
//!             info!(text = %event.message.plain_text, "message");
//!         })
//!         .build();
//!
//!     BotRuntime::new()?.run(router).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default), `yaml-config`: config file formats
//! - `http-server` (default): webhook ingress
//! - `ws-client` (default): WebSocket ingress
//! - `json-log`: JSON log lines

pub use traq_bot_core as core;
pub use traq_bot_runtime as runtime;
pub use traq_bot_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use traq_bot::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use traq_bot_runtime::{BotRuntime, RuntimeError, RuntimeResult};

    // Routing - for registering handlers
    pub use traq_bot_core::{
        CancellationToken, DispatchOutcome, EventName, EventRouter, EventRouterBuilder,
        HandlerError,
    };

    // Event payloads
    pub use traq_bot_core::event::*;

    // Custom sources
    pub use traq_bot_core::{Bot, Envelope, EventSource, HandoffQueue, async_trait};

    // Logging macros
    pub use traq_bot_runtime::prelude::*;
}
