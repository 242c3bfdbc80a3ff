//! calc.toml configuration parser.

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "info,calcd=debug,calc_trigger=debug";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid bind address: {0}")]
    InvalidBind(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalcConfig {
    pub server: Option<ServerConfig>,
    pub handler: Option<HandlerConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    /// Request bodies larger than this are rejected before decoding.
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Answer `GET` with a literal `GET` body instead of rejecting it.
    pub health_echo: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: Option<String>,
}

impl CalcConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CalcConfig = toml::from_str(content)?;
        config.bind_addr()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Address the HTTP trigger listens on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self
            .server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND);
        bind.parse()
            .map_err(|_| ConfigError::InvalidBind(bind.to_string()))
    }

    pub fn max_body_bytes(&self) -> usize {
        self.server
            .as_ref()
            .and_then(|s| s.max_body_bytes)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    pub fn health_echo(&self) -> bool {
        self.handler
            .as_ref()
            .and_then(|h| h.health_echo)
            .unwrap_or(false)
    }

    pub fn log_filter(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|l| l.filter.as_deref())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Override the bind address.
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.server.get_or_insert_with(ServerConfig::default).bind = Some(bind.into());
        self
    }

    /// Override the request body limit.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.server
            .get_or_insert_with(ServerConfig::default)
            .max_body_bytes = Some(limit);
        self
    }

    /// Override the GET health echo.
    pub fn with_health_echo(mut self, enabled: bool) -> Self {
        self.handler
            .get_or_insert_with(HandlerConfig::default)
            .health_echo = Some(enabled);
        self
    }

    /// Fully populated config with every default spelled out.
    pub fn scaffold() -> Self {
        CalcConfig {
            server: Some(ServerConfig {
                bind: Some(DEFAULT_BIND.to_string()),
                max_body_bytes: Some(DEFAULT_MAX_BODY_BYTES),
            }),
            handler: Some(HandlerConfig {
                health_echo: Some(false),
            }),
            log: Some(LogConfig {
                filter: Some(DEFAULT_LOG_FILTER.to_string()),
            }),
        }
    }
}
