//! Runtime error types.

use thiserror::Error;
use traq_bot_core::{BotError, TransportError};

use crate::config::ConfigError;

/// Errors that can occur while running a bot.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The transport could not be set up.
    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),

    /// The configured transport was compiled out.
    #[error("Transport `{0}` is not available; enable the `{0}` feature")]
    TransportUnavailable(&'static str),

    /// The dispatch loop terminated with an error.
    #[error("Bot failed: {0}")]
    Bot(#[from] BotError),

    /// The bot task panicked or was aborted.
    #[error("Bot task failed: {0}")]
    Task(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
