//! On-demand prediction endpoint.

use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::prediction::{PredictionReport, VitalsInput};

/// POST /api/predict
///
/// With an empty body the latest sample is used; otherwise the body is a
/// [`VitalsInput`] and may omit fields, which then fail validation.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictionReport>, ApiError> {
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        let latest = state.monitor.latest().ok_or_else(|| {
            ApiError::validation("No reading available yet. Start a source first.")
        })?;
        VitalsInput::from(&latest)
    } else {
        serde_json::from_slice::<VitalsInput>(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?
    };

    let report = state.predictor.predict(&input).await?;

    let _ = state
        .ws_broadcast
        .send(crate::dashboard::websocket::create_prediction_update(&report));

    Ok(Json(report))
}
