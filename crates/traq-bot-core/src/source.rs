//! The capability every transport provides to the dispatch loop.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::envelope::Envelope;
use crate::error::TransportResult;
use crate::queue::HandoffQueue;

/// A strategy for obtaining the next [`Envelope`].
///
/// The dispatch loop is written once against this trait; it never knows
/// whether events are pushed to it over HTTP or pulled from a socket.
#[async_trait]
pub trait EventSource: Send {
    /// Prepares the source before the first event is requested.
    ///
    /// Socket transports connect eagerly here. The default does nothing.
    async fn initialize(&mut self, _cancel: &CancellationToken) -> TransportResult<()> {
        Ok(())
    }

    /// Waits for the next envelope.
    ///
    /// Returns [`TransportError::Cancelled`](crate::error::TransportError::Cancelled)
    /// once `cancel` fires.
    async fn next_event(&mut self, cancel: &CancellationToken) -> TransportResult<Envelope>;

    /// Releases the source's resources. Must not fail if already closed.
    async fn shutdown(&mut self) {}
}

#[async_trait]
impl EventSource for Box<dyn EventSource> {
    async fn initialize(&mut self, cancel: &CancellationToken) -> TransportResult<()> {
        (**self).initialize(cancel).await
    }

    async fn next_event(&mut self, cancel: &CancellationToken) -> TransportResult<Envelope> {
        (**self).next_event(cancel).await
    }

    async fn shutdown(&mut self) {
        (**self).shutdown().await
    }
}

/// A bare queue is a source too; this is what push transports consume.
#[async_trait]
impl EventSource for std::sync::Arc<HandoffQueue<Envelope>> {
    async fn next_event(&mut self, cancel: &CancellationToken) -> TransportResult<Envelope> {
        Ok(self.dequeue(cancel).await?)
    }
}
