//! Source control and monitor state endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::controller::{ControllerStatus, StartRequest};
use crate::dashboard::types::SampleView;
use crate::vitals::{classify_sample, ChartData};

/// Controller status plus the latest classified sample.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub controller: ControllerStatus,
    pub latest: Option<SampleView>,
    pub window_len: usize,
}

pub async fn status_snapshot(state: &AppState) -> StatusResponse {
    let latest = state
        .monitor
        .latest()
        .map(|sample| SampleView::new(&sample, &classify_sample(&sample)));

    StatusResponse {
        controller: state.controller.status().await,
        latest,
        window_len: state.monitor.window_len(),
    }
}

/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(status_snapshot(&state).await)
}

/// GET /api/window
pub async fn window(State(state): State<Arc<AppState>>) -> Json<ChartData> {
    Json(state.monitor.chart())
}

/// POST /api/start - start or switch the active source.
pub async fn start(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<ControllerStatus>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let status = state.controller.start(request).await?;
    Ok(Json(status))
}

/// POST /api/stop
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<ControllerStatus> {
    Json(state.controller.stop().await)
}
