//! Health check endpoint handler.

use crate::api::AppState;
use crate::controller::Mode;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    pub window_len: usize,
}

/// GET /health - Liveness plus a summary of the monitor.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let controller = state.controller.status().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.metrics_collector.uptime_seconds(),
        running: controller.running,
        mode: controller.mode,
        window_len: state.monitor.window_len(),
    })
}
