//! # traQ Bot Core
//!
//! Transport-agnostic building blocks of a traQ bot: the event envelope, the
//! handoff queue push transports feed, the event catalogue with its payload
//! models, the router, and the dispatch loop.
//!
//! ## Data Flow
//!
//! ```text
//! ┌───────────────┐     ┌──────────┐     ┌─────────────┐     ┌─────────┐
//! │ EventSource   │────▶│ Envelope │────▶│ EventRouter │────▶│ Handler │
//! │ (push/socket) │     └──────────┘     │  (decode)   │     └─────────┘
//! └───────────────┘                      └─────────────┘
//!         ▲
//!         │ next_event()
//!   ┌─────┴─────┐
//!   │    Bot    │  one event at a time, until cancelled
//!   └───────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use traq_bot_core::{Bot, EventRouter, HandoffQueue};
//! use tokio_util::sync::CancellationToken;
//!
//! let queue = Arc::new(HandoffQueue::new());
//! let router = EventRouter::builder()
//!     .on_ping(|event, _| async move {
//!         tracing::info!(time = %event.event_time, "ping");
//!     })
//!     .build();
//!
//! let mut bot = Bot::new(Arc::clone(&queue), router);
//! bot.run(CancellationToken::new()).await?;
//! ```

pub mod bot;
pub mod catalogue;
pub mod envelope;
pub mod error;
pub mod event;
pub mod queue;
pub mod router;
pub mod source;

pub use bot::Bot;
pub use catalogue::EventName;
pub use envelope::Envelope;
pub use error::{
    BotError, BotResult, DispatchError, HandlerError, QueueError, TransportError,
    TransportResult,
};
pub use queue::HandoffQueue;
pub use router::{DispatchOutcome, EventRouter, EventRouterBuilder, IntoHandlerResult};
pub use source::EventSource;

pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
