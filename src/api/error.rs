//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::controller::ControllerError;
use crate::prediction::PredictionError;

/// Error envelope returned by every API endpoint.
///
/// ```json
/// { "error": { "message": "...", "type": "invalid_request_error", "code": "validation_error" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    fn new(message: impl Into<String>, r#type: &str, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.into(),
                r#type: r#type.to_string(),
                code: Some(code.to_string()),
            },
        }
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, "invalid_request_error", "invalid_request_error")
    }

    /// Create a validation error (422).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, "invalid_request_error", "validation_error")
    }

    /// Create a bad gateway error (502).
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(message, "server_error", "bad_gateway")
    }

    /// Create a gateway timeout error (504).
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(message, "server_error", "gateway_timeout")
    }

    /// Get the HTTP status code for this error.
    fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("validation_error") => StatusCode::UNPROCESSABLE_ENTITY,
            Some("bad_gateway") => StatusCode::BAD_GATEWAY,
            Some("gateway_timeout") => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(e: PredictionError) -> Self {
        let message = e.to_string();
        match e {
            PredictionError::Validation { .. } => ApiError::validation(message),
            PredictionError::Timeout(_) => ApiError::gateway_timeout(message),
            PredictionError::Network(_)
            | PredictionError::Upstream { .. }
            | PredictionError::InvalidResponse(_) => ApiError::bad_gateway(message),
        }
    }
}

impl From<ControllerError> for ApiError {
    fn from(e: ControllerError) -> Self {
        ApiError::validation(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
