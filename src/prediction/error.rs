//! Error types for prediction requests.

use thiserror::Error;

/// Errors that can occur while requesting a prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Input rejected before any network call.
    #[error("Invalid input: {field} {reason}")]
    Validation { field: &'static str, reason: String },

    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Prediction service returned a non-success status.
    #[error("Prediction service error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response body doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl PredictionError {
    pub fn missing(field: &'static str) -> Self {
        PredictionError::Validation {
            field,
            reason: "is required".to_string(),
        }
    }

    /// Short label used in metrics and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Validation { .. } => "validation_error",
            PredictionError::Network(_) => "network_error",
            PredictionError::Timeout(_) => "timeout",
            PredictionError::Upstream { .. } => "upstream_error",
            PredictionError::InvalidResponse(_) => "invalid_response",
        }
    }
}
