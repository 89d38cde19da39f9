//! Webhook ("push") ingestion.
//!
//! The platform POSTs each event to the bot. The HTTP layer hands the four
//! extracted values to [`PushTransport::submit`], which checks the
//! verification token and enqueues an [`Envelope`] without waiting for the
//! dispatch loop. The loop pulls them back out through [`EventSource`].
//!
//! The token check is a plain shared-secret string comparison. It is not a
//! constant-time or cryptographic authentication scheme.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};
use traq_bot_core::{Envelope, EventSource, HandoffQueue, TransportResult};

/// Result of a [`PushTransport::submit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The envelope was queued.
    Accepted,
    /// The envelope was refused and nothing was queued.
    Rejected(RejectReason),
}

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The token challenge did not equal the configured verification token.
    InvalidToken,
}

/// Push transport backed by a [`HandoffQueue`].
///
/// Cloning is cheap; all clones share one queue. Clone it into the HTTP
/// handler and hand the original to the dispatch loop.
#[derive(Clone)]
pub struct PushTransport {
    queue: Arc<HandoffQueue<Envelope>>,
    verification_token: Option<Arc<str>>,
}

impl PushTransport {
    /// Creates a transport expecting `verification_token`.
    ///
    /// With `None`, only requests that carry no token are accepted.
    pub fn new(verification_token: Option<String>) -> Self {
        Self {
            queue: Arc::new(HandoffQueue::new()),
            verification_token: verification_token.map(Arc::from),
        }
    }

    /// Submits one event.
    ///
    /// Never blocks and never applies backpressure: a slow consumer makes the
    /// queue grow.
    pub fn submit(
        &self,
        event_name: impl Into<String>,
        request_id: Option<String>,
        token_challenge: Option<&str>,
        body: Value,
    ) -> SubmitOutcome {
        if self.verification_token.as_deref() != token_challenge {
            warn!(request_id = ?request_id, "Invalid verification token detected");
            return SubmitOutcome::Rejected(RejectReason::InvalidToken);
        }

        let envelope = Envelope::new(event_name, request_id, body);
        trace!(
            event = %envelope.event_name(),
            request_id = ?envelope.request_id(),
            "Queued pushed event"
        );
        self.queue.enqueue(envelope);
        SubmitOutcome::Accepted
    }

    /// Returns the number of queued, not yet consumed envelopes.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl std::fmt::Debug for PushTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushTransport")
            .field("queue", &self.queue)
            .field("has_token", &self.verification_token.is_some())
            .finish()
    }
}

#[async_trait]
impl EventSource for PushTransport {
    async fn next_event(&mut self, cancel: &CancellationToken) -> TransportResult<Envelope> {
        Ok(self.queue.dequeue(cancel).await?)
    }
}
