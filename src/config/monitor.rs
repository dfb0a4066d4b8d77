//! Window, source and startup configuration

use serde::{Deserialize, Serialize};

use crate::controller::Mode;
use crate::source::{SimulationKind, DEFAULT_INTERVAL_MS};
use crate::vitals::DEFAULT_CAPACITY;

/// Chart window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Samples kept per series
    pub capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Simulated source defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub kind: SimulationKind,
    pub interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            kind: SimulationKind::Normal,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

/// Device feed connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub endpoint: String,
    pub connect_timeout_seconds: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:5001".to_string(),
            connect_timeout_seconds: 10,
        }
    }
}

/// What the monitor does at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub mode: Mode,
    /// Start the configured source as soon as the server is up
    pub autostart: bool,
}
