//! Type definitions for dashboard data structures

use serde::{Deserialize, Serialize};

use crate::vitals::{MetricStatus, Sample};

/// WebSocket update message sent to dashboard clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketUpdate {
    /// Type of update
    pub update_type: UpdateType,
    /// JSON payload for the update
    pub data: serde_json::Value,
}

/// Type of WebSocket update
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    /// New sample accepted into the window
    Sample,
    /// Chart contents changed
    WindowUpdate,
    /// Controller or device connection status changed
    Status,
    /// Prediction finished
    Prediction,
    /// Critical prediction requires attention
    Emergency,
}

/// Reading with its classification, as shown on a metric card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricCard {
    pub metric: crate::vitals::Metric,
    pub label: String,
    pub unit: String,
    pub value: f64,
    pub status: crate::vitals::Status,
    pub status_label: String,
}

impl From<&MetricStatus> for MetricCard {
    fn from(status: &MetricStatus) -> Self {
        Self {
            metric: status.metric,
            label: status.metric.label().to_string(),
            unit: status.metric.unit().to_string(),
            value: status.value,
            status: status.status,
            status_label: status.status.label().to_string(),
        }
    }
}

/// Latest sample with per-metric cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleView {
    pub sample: Sample,
    pub blood_pressure: String,
    pub cards: Vec<MetricCard>,
}

impl SampleView {
    pub fn new(sample: &Sample, statuses: &[MetricStatus]) -> Self {
        Self {
            sample: *sample,
            blood_pressure: sample.blood_pressure(),
            cards: statuses.iter().map(MetricCard::from).collect(),
        }
    }
}
