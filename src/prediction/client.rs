//! HTTP client for the remote prediction service.

use std::time::{Duration, Instant};

use reqwest::Client;
use uuid::Uuid;

use super::error::PredictionError;
use super::types::{decode_response, upstream_message, PredictionOutcome, PredictionRequest, VitalsInput};

/// Header carrying the per-call request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Posts readings to the prediction endpoint. One attempt per call, no retry.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Validates `input` and requests a prediction.
    ///
    /// Validation failures return before any network call.
    pub async fn request_prediction(
        &self,
        input: &VitalsInput,
    ) -> Result<PredictionOutcome, PredictionError> {
        let request = input.validate()?;
        self.send(&request, Uuid::new_v4()).await
    }

    /// Sends an already validated request.
    pub async fn send(
        &self,
        request: &PredictionRequest,
        request_id: Uuid,
    ) -> Result<PredictionOutcome, PredictionError> {
        let started = Instant::now();
        let result = self.post(request, request_id).await;
        let elapsed = started.elapsed();

        let outcome_label = match &result {
            Ok(outcome) => outcome.label(),
            Err(e) => e.kind(),
        };
        metrics::counter!("lifeline_predictions_total", "outcome" => outcome_label).increment(1);
        metrics::histogram!("lifeline_prediction_duration_seconds").record(elapsed.as_secs_f64());

        match &result {
            Ok(outcome) => tracing::info!(
                request_id = %request_id,
                outcome = outcome_label,
                predictions = outcome.predictions().len(),
                latency_ms = elapsed.as_millis() as u64,
                "Prediction completed"
            ),
            Err(e) => tracing::warn!(
                request_id = %request_id,
                error = %e,
                latency_ms = elapsed.as_millis() as u64,
                "Prediction failed"
            ),
        }

        result
    }

    async fn post(
        &self,
        request: &PredictionRequest,
        request_id: Uuid,
    ) -> Result<PredictionOutcome, PredictionError> {
        tracing::debug!(request_id = %request_id, endpoint = %self.endpoint, "Requesting prediction");

        let response = self
            .client
            .post(&self.endpoint)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PredictionError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    PredictionError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                PredictionError::Timeout(self.timeout.as_millis() as u64)
            } else {
                PredictionError::Network(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(PredictionError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        decode_response(&body)
    }
}
