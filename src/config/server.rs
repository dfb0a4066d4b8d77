//! Dashboard server settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigError;

/// Where the dashboard and JSON API listen, and how updates reach browsers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    /// Serve the embedded dashboard page and its assets.
    /// The JSON API and `/ws` stay up either way.
    pub dashboard: bool,
    /// Updates queued per dashboard client before it starts skipping
    pub update_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 30,
            dashboard: true,
            update_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::invalid("server.port", "port must be non-zero"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout_seconds",
                "timeout must be non-zero",
            ));
        }
        if self.update_buffer == 0 {
            return Err(ConfigError::invalid(
                "server.update_buffer",
                "at least one update must fit in a client's queue",
            ));
        }
        Ok(())
    }
}
