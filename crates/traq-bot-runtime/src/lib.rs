//! traQ Bot Runtime - Configuration and lifecycle for traQ bots.
//!
//! This crate provides:
//! - Layered configuration (`config`): defaults, files, `TRAQ_BOT_*` variables
//! - Logging setup (`logging`) driven by that configuration
//! - [`BotRuntime`], which opens the configured transport, runs the dispatch
//!   loop and shuts both down on Ctrl+C or SIGTERM
//!
//! # Transport Selection
//!
//! `bot.transport.type` picks the ingress; each needs its cargo feature:
//!
//! | type          | feature       | ingress                               |
//! |---------------|---------------|---------------------------------------|
//! | `http-server` | `http-server` | webhook listener feeding a queue      |
//! | `ws-client`   | `ws-client`   | reconnecting socket to `<base>/bots/ws` |
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [bot.transport]
//! type = "ws-client"
//! base_url = "https://q.trap.jp/api/v3"
//! access_token = "..."
//! ```
//!
//! ```ignore
//! use traq_bot_core::EventRouter;
//! use traq_bot_runtime::BotRuntime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = EventRouter::builder()
//!         .on_ping(|event, _cancel| async move {
//!             tracing::info!(time = %event.event_time, "ping");
//!         })
//!         .build();
//!
//!     BotRuntime::new()?.run(router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    BotConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig, TransportConfig,
    TraqBotConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{BotRuntime, RuntimeBuilder, shutdown_signal};

// Re-export tracing for use by bot crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// Logging macros plus `instrument` and `Level`.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
