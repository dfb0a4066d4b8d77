//! # Metrics Collection Module
//!
//! Prometheus export of pipeline and prediction metrics at `GET /metrics`.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `lifeline_samples_total{source}` - Samples accepted into the window
//! - `lifeline_samples_rejected_total` - Samples from stopped sources
//! - `lifeline_stream_messages_dropped_total{reason}` - Malformed device messages
//! - `lifeline_predictions_total{outcome}` - Prediction calls by outcome
//!
//! **Histograms:**
//! - `lifeline_prediction_duration_seconds` - Prediction round-trip time
//!
//! **Gauges:**
//! - `lifeline_window_len` - Samples currently in the window
//! - `lifeline_source_generation` - Generation of the active source
//! - `lifeline_uptime_seconds` - Seconds since startup

pub mod handler;

// Re-export PrometheusBuilder for test compatibility
pub use metrics_exporter_prometheus::PrometheusBuilder;

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

use crate::monitor::MonitorState;

/// Renders metrics and refreshes gauges derived from monitor state.
pub struct MetricsCollector {
    monitor: Arc<MonitorState>,
    start_time: Instant,
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        monitor: Arc<MonitorState>,
        start_time: Instant,
        prometheus_handle: PrometheusHandle,
    ) -> Self {
        Self {
            monitor,
            start_time,
            prometheus_handle,
        }
    }

    /// Update gauges computed from current state.
    pub fn update_gauges(&self) {
        metrics::gauge!("lifeline_window_len").set(self.monitor.window_len() as f64);
        metrics::gauge!("lifeline_source_generation").set(self.monitor.generation() as f64);
        metrics::gauge!("lifeline_uptime_seconds").set(self.uptime_seconds() as f64);
    }

    /// Get uptime in seconds since startup.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Initialize Prometheus metrics exporter with custom histogram buckets.
///
/// Prediction duration buckets: [0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1, 2.5, 5, 10] seconds.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let duration_buckets = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("lifeline_prediction_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Installs the global recorder, or builds a detached one if a recorder is
/// already installed (e.g. several app states in one test binary).
pub fn setup_or_detached() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}
