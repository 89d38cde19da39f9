//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    HttpServerConfig, LogOutput, LoggingConfig, TransportConfig, TraqBotConfig, WsClientConfig,
};

/// Validates the entire configuration.
pub fn validate_config(config: &TraqBotConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_transport_config(&config.bot.transport)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid logging filter module: {module:?}"
        )));
    }

    Ok(())
}

/// Validates transport configuration.
fn validate_transport_config(transport: &TransportConfig) -> ConfigResult<()> {
    match transport {
        TransportConfig::HttpServer(config) => validate_http_server(config),
        TransportConfig::WsClient(config) => validate_ws_client(config),
    }
}

fn validate_http_server(config: &HttpServerConfig) -> ConfigResult<()> {
    if config.host.is_empty() {
        return Err(ConfigError::missing_field("bot.transport.host"));
    }
    validate_port(config.port)?;
    validate_path(&config.path)?;
    Ok(())
}

fn validate_ws_client(config: &WsClientConfig) -> ConfigResult<()> {
    validate_url(&config.base_url)?;

    let present = |token: &Option<String>| token.as_deref().is_some_and(|t| !t.is_empty());
    match (present(&config.access_token), present(&config.session_token)) {
        (true, false) | (false, true) => Ok(()),
        (false, false) => Err(ConfigError::missing_field(
            "bot.transport.access_token or bot.transport.session_token",
        )),
        (true, true) => Err(ConfigError::validation(
            "Only one of access_token and session_token may be set",
        )),
    }
}

/// Validates an API base URL.
fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("bot.transport.base_url"));
    }

    let valid_schemes = ["http://", "https://"];
    let Some(rest) = valid_schemes.iter().find_map(|s| url.strip_prefix(s)) else {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    };

    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::invalid_url(url, "URL has no host"));
    }

    Ok(())
}

/// Validates a port number.
fn validate_port(port: u16) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

/// Validates a path.
fn validate_path(path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::validation("Path must start with '/'"));
    }
    Ok(())
}
