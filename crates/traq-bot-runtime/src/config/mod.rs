//! Configuration for the traQ bot runtime.
//!
//! Settings are layered from defaults, config files and `TRAQ_BOT_*`
//! environment variables, then validated before the runtime starts.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotConfig, HttpServerConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    SpanEventConfig, TransportConfig, TraqBotConfig, WsClientConfig,
};
pub use validation::validate_config;
