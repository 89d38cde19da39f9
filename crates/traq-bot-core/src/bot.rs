//! The dispatch loop.
//!
//! ```text
//!  run(cancel)
//!    ├─ source.initialize()
//!    ├─ router.initialize()
//!    ├─ loop until cancelled:
//!    │    envelope = source.next_event()
//!    │    router.dispatch(envelope)      (awaited; one event at a time)
//!    └─ source.shutdown()
//! ```
//!
//! Failures and how they end the loop:
//!
//! | condition                      | outcome                   |
//! |--------------------------------|---------------------------|
//! | cancellation                   | `Ok(())`                  |
//! | unknown event name             | logged, loop continues    |
//! | body fails to decode           | `Err(BotError::Dispatch)` |
//! | handler error                  | `Err(BotError::Dispatch)` |
//! | handler error after cancel     | `Ok(())`                  |
//! | fatal transport error          | `Err(BotError::Transport)`|

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{BotError, BotResult, DispatchError};
use crate::router::EventRouter;
use crate::source::EventSource;

/// A bot: one event source feeding one router.
pub struct Bot<S> {
    source: S,
    router: EventRouter,
}

impl<S: EventSource> Bot<S> {
    /// Creates a bot from a source and a router.
    pub fn new(source: S, router: EventRouter) -> Self {
        Self { source, router }
    }

    /// Returns the router.
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Returns the event source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs until `cancel` fires or a fatal error occurs.
    ///
    /// The source is shut down before returning in either case. A cancelled
    /// transport, or a handler that fails after cancellation was requested,
    /// counts as a clean shutdown. Decode and transport failures stay fatal.
    pub async fn run(&mut self, cancel: CancellationToken) -> BotResult<()> {
        info!("Bot starting");
        let result = self.run_inner(&cancel).await;
        self.source.shutdown().await;

        match result {
            Ok(()) => {
                info!("Bot stopped");
                Ok(())
            }
            Err(e) if is_graceful_stop(&e, &cancel) => {
                warn!(error = %e, "Bot stopped by cancellation");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Bot terminated");
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self, cancel: &CancellationToken) -> BotResult<()> {
        self.source.initialize(cancel).await?;
        self.router
            .initialize(cancel)
            .await
            .map_err(BotError::Initialize)?;

        while !cancel.is_cancelled() {
            let envelope = self.source.next_event(cancel).await?;
            debug!(
                event = %envelope.event_name(),
                request_id = ?envelope.request_id(),
                "Received event"
            );
            self.router.dispatch(envelope, cancel).await?;
        }

        Ok(())
    }
}

fn is_graceful_stop(err: &BotError, cancel: &CancellationToken) -> bool {
    err.is_cancellation()
        || (cancel.is_cancelled()
            && matches!(err, BotError::Dispatch(DispatchError::Handler { .. })))
}

impl<S> std::fmt::Debug for Bot<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot").field("router", &self.router).finish()
    }
}
