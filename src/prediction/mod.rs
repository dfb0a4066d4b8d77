//! Health-risk prediction.
//!
//! [`PredictionClient`] talks to the remote service. [`Predictor`] wraps it
//! with the user-facing side: insight texts and emergency notification when
//! a response contains a critical condition.

pub mod client;
pub mod error;
pub mod insight;
pub mod types;

pub use client::PredictionClient;
pub use error::PredictionError;
pub use types::{
    decode_response, Prediction, PredictionOutcome, PredictionRequest, Severity, VitalsInput,
};

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

/// Emergency raised for a critical prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyAlert {
    pub request_id: Uuid,
    pub condition: String,
    pub probability: f64,
    pub message: String,
}

/// Receives emergency alerts. Called at most once per prediction response.
pub trait EmergencyNotifier: Send + Sync {
    fn notify(&self, alert: &EmergencyAlert);
}

/// Notifier that only logs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl EmergencyNotifier for LogNotifier {
    fn notify(&self, alert: &EmergencyAlert) {
        tracing::error!(
            request_id = %alert.request_id,
            condition = %alert.condition,
            probability = alert.probability,
            "Critical health risk detected"
        );
    }
}

/// Interpreted prediction result ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub request_id: Uuid,
    pub outcome: PredictionOutcome,
    pub insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency: Option<EmergencyAlert>,
}

/// Prediction client plus emergency notification.
#[derive(Clone)]
pub struct Predictor {
    client: PredictionClient,
    notifier: Arc<dyn EmergencyNotifier>,
}

impl Predictor {
    pub fn new(client: PredictionClient) -> Self {
        Self {
            client,
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn EmergencyNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Requests a prediction for `input`.
    ///
    /// If the outcome contains a critical prediction the notifier is called
    /// once, naming the first critical condition.
    pub async fn predict(&self, input: &VitalsInput) -> Result<PredictionReport, PredictionError> {
        let request = input.validate()?;
        let request_id = Uuid::new_v4();
        let outcome = self.client.send(&request, request_id).await?;

        let emergency = outcome.first_critical().map(|critical| EmergencyAlert {
            request_id,
            condition: critical.condition.clone(),
            probability: critical.probability,
            message: insight::emergency_message(&critical.condition),
        });
        if let Some(alert) = &emergency {
            self.notifier.notify(alert);
        }

        Ok(PredictionReport {
            request_id,
            insights: insight::insights(&outcome),
            outcome,
            emergency,
        })
    }
}
