//! Prediction service configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Full URL the readings are posted to
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/predict".to_string(),
            timeout_seconds: 10,
        }
    }
}
