//! Configuration module for Lifeline
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`LIFELINE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use lifeline::config::LifelineConfig;
//!
//! let config = LifelineConfig::default();
//! assert_eq!(config.server.port, 8080);
//!
//! let toml = r#"
//! [window]
//! capacity = 50
//! "#;
//! let config: LifelineConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.window.capacity, 50);
//! ```

pub mod error;
pub mod logging;
pub mod monitor;
pub mod prediction;
pub mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use monitor::{MonitorConfig, SimulationConfig, StreamConfig, WindowConfig};
pub use prediction::PredictionConfig;
pub use server::ServerConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::controller::{validate_stream_endpoint, ControllerSettings};
use crate::source::MIN_INTERVAL_MS;
use crate::vitals::MAX_CAPACITY;

/// Annotated example configuration written by `lifeline config init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../lifeline.example.toml");

/// Unified configuration for the Lifeline server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LifelineConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Chart window size
    pub window: WindowConfig,
    /// Simulated source defaults
    pub simulation: SimulationConfig,
    /// Device feed connection
    pub stream: StreamConfig,
    /// Prediction service
    pub prediction: PredictionConfig,
    /// Startup behaviour
    pub monitor: MonitorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl LifelineConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports LIFELINE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("LIFELINE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("LIFELINE_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("LIFELINE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LIFELINE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(capacity) = std::env::var("LIFELINE_WINDOW_CAPACITY") {
            if let Ok(c) = capacity.parse() {
                self.window.capacity = c;
            }
        }
        if let Ok(kind) = std::env::var("LIFELINE_SIMULATION_KIND") {
            if let Ok(k) = kind.parse() {
                self.simulation.kind = k;
            }
        }
        if let Ok(interval) = std::env::var("LIFELINE_INTERVAL_MS") {
            if let Ok(i) = interval.parse() {
                self.simulation.interval_ms = i;
            }
        }

        if let Ok(endpoint) = std::env::var("LIFELINE_STREAM_ENDPOINT") {
            self.stream.endpoint = endpoint;
        }
        if let Ok(endpoint) = std::env::var("LIFELINE_PREDICTION_ENDPOINT") {
            self.prediction.endpoint = endpoint;
        }

        if let Ok(autostart) = std::env::var("LIFELINE_AUTOSTART") {
            self.monitor.autostart = autostart.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logging.validate()?;

        if !(1..=MAX_CAPACITY).contains(&self.window.capacity) {
            return Err(ConfigError::invalid(
                "window.capacity",
                format!("capacity must be between 1 and {}", MAX_CAPACITY),
            ));
        }

        if self.simulation.interval_ms < MIN_INTERVAL_MS {
            return Err(ConfigError::invalid(
                "simulation.interval_ms",
                format!("interval must be at least {}ms", MIN_INTERVAL_MS),
            ));
        }

        validate_stream_endpoint(&self.stream.endpoint)
            .map_err(|e| ConfigError::invalid("stream.endpoint", e.to_string()))?;

        let endpoint = &self.prediction.endpoint;
        if endpoint.is_empty() {
            return Err(ConfigError::invalid(
                "prediction.endpoint",
                "URL cannot be empty",
            ));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "prediction.endpoint",
                "URL must start with http:// or https://",
            ));
        }

        if self.prediction.timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "prediction.timeout_seconds",
                "timeout must be non-zero",
            ));
        }

        Ok(())
    }

    /// Defaults handed to the mode controller.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            default_kind: self.simulation.kind,
            default_interval_ms: self.simulation.interval_ms,
            stream_endpoint: self.stream.endpoint.clone(),
            connect_timeout: Duration::from_secs(self.stream.connect_timeout_seconds),
        }
    }

    pub fn prediction_timeout(&self) -> Duration {
        Duration::from_secs(self.prediction.timeout_seconds)
    }
}
