//! Configuration schema definitions.
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "compact"
//!
//! [logging.filters]
//! traq_bot_transport = "debug"
//!
//! [bot.transport]
//! type = "ws-client"
//! base_url = "https://q.trap.jp/api/v3"
//! access_token = "..."
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraqBotConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bot settings.
    #[serde(default)]
    pub bot: BotConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-frame detail.
    Trace,
    /// Routing decisions.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Skipped events and recoverable failures.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Returns the level name as used in filter directives.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to the `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single line, abbreviated.
    #[default]
    Compact,
    /// Single line with all fields.
    Full,
    /// Multi-line, human oriented.
    Pretty,
    /// One JSON object per line. Requires the `json-log` feature.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// The file at `logging.file_path`.
    File,
}

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// A single file.
    #[default]
    Never,
    /// A new file every hour.
    Hourly,
    /// A new file every day.
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    /// Span created.
    #[serde(default)]
    pub new: bool,
    /// Span entered.
    #[serde(default)]
    pub enter: bool,
    /// Span exited.
    #[serde(default)]
    pub exit: bool,
    /// Span closed.
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level. `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    /// Line layout.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required for [`LogOutput::File`].
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// File rotation policy.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Per-module levels, e.g. `traq_bot_transport = "trace"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,

    /// Span lifecycle events.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,
}

// =============================================================================
// Bot
// =============================================================================

/// Bot configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// How events are received.
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Transport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TransportConfig {
    /// Receive webhook POSTs.
    HttpServer(HttpServerConfig),

    /// Keep a WebSocket open to the platform.
    WsClient(WsClientConfig),
}

impl TransportConfig {
    /// Returns the transport type name as written in configuration.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::HttpServer(_) => "http-server",
            Self::WsClient(_) => "ws-client",
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::HttpServer(HttpServerConfig::default())
    }
}

/// Webhook server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path the platform POSTs to.
    #[serde(default = "default_http_path")]
    pub path: String,

    /// Expected `X-TRAQ-BOT-TOKEN` value.
    #[serde(default)]
    pub verification_token: Option<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_http_path(),
            verification_token: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_http_path() -> String {
    "/".to_string()
}

/// WebSocket client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsClientConfig {
    /// API base URL; the socket lives at `<base_url>/bots/ws`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bot access token, sent as a bearer token.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Session token, sent as the `r_session` cookie.
    #[serde(default)]
    pub session_token: Option<String>,
}

impl Default for WsClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            session_token: None,
        }
    }
}

fn default_base_url() -> String {
    "https://q.trap.jp/api/v3".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transport_is_tagged() {
        let config: BotConfig = serde_json::from_value(json!({
            "transport": {
                "type": "ws-client",
                "access_token": "abc"
            }
        }))
        .unwrap();

        match config.transport {
            TransportConfig::WsClient(ws) => {
                assert_eq!(ws.base_url, "https://q.trap.jp/api/v3");
                assert_eq!(ws.access_token.as_deref(), Some("abc"));
                assert_eq!(ws.session_token, None);
            }
            other => panic!("unexpected transport: {}", other.type_name()),
        }
    }

    #[test]
    fn test_defaults() {
        let config = TraqBotConfig::default();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.bot.transport.type_name(), "http-server");
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let result: Result<LoggingConfig, _> = serde_json::from_value(json!({ "level": "loud" }));
        assert!(result.is_err());
    }
}
