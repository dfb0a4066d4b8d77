//! Logging configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

use super::ConfigError;

/// Modules that accept a `component_levels` entry, as in `lifeline::<name>`.
pub const COMPONENTS: &[&str] = &[
    "api",
    "cli",
    "controller",
    "dashboard",
    "metrics",
    "monitor",
    "prediction",
    "source",
];

/// Log output format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels, e.g. `{ source = "debug" }`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
    /// Log the values of every accepted reading.
    /// Off by default: readings are patient data.
    pub log_readings: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
            log_readings: false,
        }
    }
}

impl LoggingConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let Some(levels) = &self.component_levels else {
            return Ok(());
        };
        for (component, level) in levels {
            if !COMPONENTS.contains(&component.as_str()) {
                return Err(ConfigError::invalid(
                    "logging.component_levels",
                    format!(
                        "unknown component '{}' (expected one of: {})",
                        component,
                        COMPONENTS.join(", ")
                    ),
                ));
            }
            if LevelFilter::from_str(level).is_err() {
                return Err(ConfigError::invalid(
                    "logging.component_levels",
                    format!("invalid level '{}' for {}", level, component),
                ));
            }
        }
        Ok(())
    }
}
