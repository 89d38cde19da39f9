//! Unified error types for the traQ bot core.
//!
//! Errors are grouped by the layer that raises them. Transports report
//! [`TransportError`], the router reports [`DispatchError`], and the dispatch
//! loop wraps both in [`BotError`].

use thiserror::Error;

/// Error type returned by user handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Queue Errors
// =============================================================================

/// Errors raised by [`HandoffQueue`](crate::queue::HandoffQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A second consumer tried to wait while another wait is still pending.
    #[error("another dequeue is already waiting")]
    AlreadyAwaiting,

    /// The pending wait was cancelled.
    #[error("dequeue was cancelled")]
    Cancelled,
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur while obtaining the next event from a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The cancellation token fired while waiting.
    #[error("operation was cancelled")]
    Cancelled,

    /// The handoff queue rejected the wait.
    #[error(transparent)]
    Queue(QueueError),

    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// A complete text frame did not contain a well-formed envelope.
    #[error("malformed event frame: {reason}")]
    MalformedFrame {
        /// Reason for failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Creates a malformed frame error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrame {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error only reports cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Queue(QueueError::Cancelled))
    }
}

impl From<QueueError> for TransportError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Cancelled => Self::Cancelled,
            other => Self::Queue(other),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors raised while routing a single envelope.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The body of a catalogued event did not decode into its argument shape.
    #[error("failed to decode body of {event}: {source}")]
    Decode {
        /// The event name.
        event: &'static str,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A handler returned an error.
    #[error("handler for {event} failed: {source}")]
    Handler {
        /// The event name.
        event: &'static str,
        /// The handler's error.
        #[source]
        source: HandlerError,
    },
}

// =============================================================================
// Bot Errors
// =============================================================================

/// Errors that terminate the dispatch loop.
#[derive(Debug, Error)]
pub enum BotError {
    /// The initialization hook failed.
    #[error("initialization failed: {0}")]
    Initialize(#[source] HandlerError),

    /// The transport failed fatally.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Routing an envelope failed fatally.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl BotError {
    /// Returns `true` if this error only reports cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_cancelled())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for the dispatch loop.
pub type BotResult<T> = Result<T, BotError>;
