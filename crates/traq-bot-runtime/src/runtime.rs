//! Lifecycle orchestration: configuration, transport setup and shutdown.
//!
//! ```text
//!  BotRuntime::run(router)
//!    ├─ open ingress from bot.transport
//!    │    http-server → PushTransport + axum listener
//!    │    ws-client   → SocketTransport
//!    ├─ spawn Bot::run(cancel)
//!    ├─ wait for Ctrl+C / SIGTERM, or for the bot to stop on its own
//!    └─ cancel, join the bot, wait for the listener to close
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use traq_bot_runtime::BotRuntime;
//!
//! // Searches ./traq-bot.toml and the user config dir, plus TRAQ_BOT_* vars
//! let runtime = BotRuntime::new()?;
//! runtime.run(router).await?;
//!
//! // Custom configuration path
//! let runtime = BotRuntime::builder()
//!     .config_file("config/traq-bot.toml")
//!     .profile("production")
//!     .build()?;
//! ```

use std::future::Future;

use futures::future::BoxFuture;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use traq_bot_core::{Bot, EventRouter, EventSource};

use crate::config::{
    ConfigLoader, ConfigResult, HttpServerConfig, TransportConfig, TraqBotConfig, WsClientConfig,
};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Runs one bot with the transport named in its configuration.
#[derive(Debug, Clone)]
pub struct BotRuntime {
    config: TraqBotConfig,
}

/// An opened transport, plus the listener to wait for after cancellation.
struct Ingress {
    source: Box<dyn EventSource>,
    server: Option<BoxFuture<'static, ()>>,
}

impl BotRuntime {
    /// Loads configuration from the current directory, the user config
    /// directory and the environment, then initializes logging.
    pub fn new() -> ConfigResult<Self> {
        Self::builder().build()
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Logging is initialized from `config.logging` unless a subscriber is
    /// already installed.
    pub fn from_config(config: TraqBotConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            transport = config.bot.transport.type_name(),
            "Runtime initialized from configuration"
        );

        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TraqBotConfig {
        &self.config
    }

    /// Runs until Ctrl+C or SIGTERM, or until the bot fails.
    pub async fn run(&self, router: EventRouter) -> RuntimeResult<()> {
        info!("traQ bot is running. Press Ctrl+C to stop.");
        self.run_until(router, shutdown_signal()).await
    }

    /// Runs until `shutdown` completes, or until the bot fails.
    pub async fn run_until<F>(&self, router: EventRouter, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let cancel = CancellationToken::new();
        let ingress = self.open_ingress(&cancel).await?;

        let result = drive(ingress.source, router, shutdown, cancel.clone()).await;

        cancel.cancel();
        if let Some(server) = ingress.server {
            server.await;
        }
        result
    }

    /// Runs `router` against a source the caller built, ignoring
    /// `bot.transport`.
    pub async fn run_source<S, F>(
        &self,
        source: S,
        router: EventRouter,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        S: EventSource + 'static,
        F: Future<Output = ()>,
    {
        drive(source, router, shutdown, CancellationToken::new()).await
    }

    async fn open_ingress(&self, cancel: &CancellationToken) -> RuntimeResult<Ingress> {
        match &self.config.bot.transport {
            TransportConfig::HttpServer(config) => push_ingress(config, cancel).await,
            TransportConfig::WsClient(config) => socket_ingress(config),
        }
    }
}

/// Spawns the bot and joins it once it stops or `shutdown` completes.
async fn drive<S, F>(
    source: S,
    router: EventRouter,
    shutdown: F,
    cancel: CancellationToken,
) -> RuntimeResult<()>
where
    S: EventSource + 'static,
    F: Future<Output = ()>,
{
    let mut bot = Bot::new(source, router);
    let token = cancel.clone();
    let mut task = tokio::spawn(async move { bot.run(token).await });

    tokio::pin!(shutdown);
    let joined = tokio::select! {
        joined = &mut task => joined,
        () = &mut shutdown => {
            info!("Shutdown requested, stopping bot");
            cancel.cancel();
            task.await
        }
    };
    cancel.cancel();

    match joined {
        Ok(result) => result.map_err(RuntimeError::from),
        Err(e) => Err(RuntimeError::Task(e.to_string())),
    }
}

/// Formats a bind address, bracketing IPv6 hosts.
fn bind_addr(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

#[cfg(feature = "http-server")]
async fn push_ingress(
    config: &HttpServerConfig,
    cancel: &CancellationToken,
) -> RuntimeResult<Ingress> {
    use traq_bot_transport::{PushTransport, serve_push};

    if config.verification_token.is_none() {
        warn!("No verification token configured, only unauthenticated requests are accepted");
    }

    let transport = PushTransport::new(config.verification_token.clone());
    let addr = bind_addr(&config.host, config.port);
    let handle = serve_push(&addr, &config.path, transport.clone(), cancel.clone()).await?;
    tracing::debug!(addr = %handle.local_addr(), "Push ingress ready");

    Ok(Ingress {
        source: Box::new(transport),
        server: Some(Box::pin(handle.stopped())),
    })
}

#[cfg(not(feature = "http-server"))]
async fn push_ingress(
    _config: &HttpServerConfig,
    _cancel: &CancellationToken,
) -> RuntimeResult<Ingress> {
    Err(RuntimeError::TransportUnavailable("http-server"))
}

#[cfg(feature = "ws-client")]
fn socket_ingress(config: &WsClientConfig) -> RuntimeResult<Ingress> {
    use traq_bot_core::TransportError;
    use traq_bot_transport::{AuthConfig, SocketTransport};

    let base_url = url::Url::parse(&config.base_url).map_err(|e| {
        TransportError::InvalidConfig(format!("invalid base URL {}: {e}", config.base_url))
    })?;
    let auth = AuthConfig::from_tokens(
        config.access_token.as_deref(),
        config.session_token.as_deref(),
        &base_url,
    )?;
    let transport = SocketTransport::new(&config.base_url, auth)?;
    tracing::debug!(endpoint = %transport.endpoint(), "Socket ingress ready");

    Ok(Ingress {
        source: Box::new(transport),
        server: None,
    })
}

#[cfg(not(feature = "ws-client"))]
fn socket_ingress(_config: &WsClientConfig) -> RuntimeResult<Ingress> {
    Err(RuntimeError::TransportUnavailable("ws-client"))
}

/// Completes on Ctrl+C, or SIGTERM on Unix.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is never observed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`BotRuntime`] with custom configuration sources.
///
/// ```rust,ignore
/// let runtime = BotRuntime::builder()
///     .config_file("config/traq-bot.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a builder searching the current and user config directories.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new()
                .with_current_dir()
                .with_user_config_dir(),
        }
    }

    /// Loads this file instead of searching.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration programmatically, above every other source.
    pub fn merge(mut self, config: TraqBotConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> ConfigResult<BotRuntime> {
        let config = self.config_loader.load()?;
        Ok(BotRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use traq_bot_core::{Envelope, HandoffQueue};

    #[test]
    fn test_bind_addr() {
        assert_eq!(bind_addr("0.0.0.0", 8080), "0.0.0.0:8080");
        assert_eq!(bind_addr("::", 80), "[::]:80");
        assert_eq!(bind_addr("[::1]", 80), "[::1]:80");
    }

    #[tokio::test]
    async fn test_run_source_stops_on_shutdown() {
        let runtime = BotRuntime::from_config(TraqBotConfig::default());
        let queue = Arc::new(HandoffQueue::new());

        let result = runtime
            .run_source(
                Arc::clone(&queue),
                EventRouter::new(),
                tokio::time::sleep(Duration::from_millis(20)),
            )
            .await;
        assert!(result.is_ok());
        assert!(!queue.has_waiter());
    }

    #[tokio::test]
    async fn test_run_source_surfaces_decode_failure() {
        let runtime = BotRuntime::from_config(TraqBotConfig::default());
        let queue = Arc::new(HandoffQueue::new());
        queue.enqueue(Envelope::new("PING", None, json!({"eventTime": 42})));

        let result = runtime
            .run_source(
                queue,
                EventRouter::new(),
                std::future::pending::<()>(),
            )
            .await;
        assert!(matches!(result, Err(RuntimeError::Bot(_))));
    }

    #[cfg(feature = "http-server")]
    #[tokio::test]
    async fn test_run_until_with_push_ingress() {
        let mut config = TraqBotConfig::default();
        config.bot.transport = TransportConfig::HttpServer(HttpServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..Default::default()
        });
        let runtime = BotRuntime::from_config(config);

        let result = runtime
            .run_until(
                EventRouter::new(),
                tokio::time::sleep(Duration::from_millis(50)),
            )
            .await;
        assert!(result.is_ok());
    }

    #[cfg(not(feature = "ws-client"))]
    #[tokio::test]
    async fn test_socket_ingress_requires_feature() {
        let mut config = TraqBotConfig::default();
        config.bot.transport = TransportConfig::WsClient(WsClientConfig {
            access_token: Some("token".into()),
            ..Default::default()
        });
        let runtime = BotRuntime::from_config(config);

        let result = runtime
            .run_until(EventRouter::new(), std::future::pending::<()>())
            .await;
        assert!(matches!(
            result,
            Err(RuntimeError::TransportUnavailable("ws-client"))
        ));
    }

    #[cfg(feature = "ws-client")]
    #[tokio::test]
    async fn test_socket_ingress_rejects_missing_credentials() {
        let mut config = TraqBotConfig::default();
        config.bot.transport = TransportConfig::WsClient(WsClientConfig::default());
        let runtime = BotRuntime::from_config(config);

        let result = runtime
            .run_until(EventRouter::new(), std::future::pending::<()>())
            .await;
        assert!(matches!(result, Err(RuntimeError::Transport(_))));
    }
}
