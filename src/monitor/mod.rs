//! Shared monitoring state written by the active metrics source.
//!
//! `MonitorState` owns the chart window and the device connection status
//! text. Sources never touch it directly: each one is handed a
//! [`SampleSink`] stamped with the generation that was current when the
//! source started. Stopping a source advances the generation, and the
//! generation check happens under the same lock as the window append, so a
//! stopped source can never append to the window again.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use crate::dashboard::types::WebSocketUpdate;
use crate::vitals::{classify_sample, ChartData, Sample, Window};

/// Connection status shown before any device connection was attempted.
pub const DISCONNECTED: &str = "Disconnected";

/// External collaborator that draws the chart from the window contents.
///
/// `redraw` is called while the window lock is held, so implementations
/// must not block.
pub trait ChartRenderer: Send + Sync {
    fn redraw(&self, chart: &ChartData);
}

/// Renderer that draws nothing.
#[derive(Debug, Default)]
pub struct NoopRenderer;

impl ChartRenderer for NoopRenderer {
    fn redraw(&self, _chart: &ChartData) {}
}

struct Inner {
    generation: u64,
    window: Window,
    connection_status: String,
}

/// Window, latest sample and connection status behind one lock.
pub struct MonitorState {
    inner: RwLock<Inner>,
    renderer: Arc<dyn ChartRenderer>,
    ws_broadcast: Option<broadcast::Sender<WebSocketUpdate>>,
    log_readings: bool,
}

impl MonitorState {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                generation: 0,
                window: Window::new(capacity),
                connection_status: DISCONNECTED.to_string(),
            }),
            renderer: Arc::new(NoopRenderer),
            ws_broadcast: None,
            log_readings: false,
        }
    }

    /// Set the chart renderer redrawn after every accepted sample.
    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the WebSocket broadcast sender for dashboard updates.
    pub fn with_broadcast(mut self, sender: broadcast::Sender<WebSocketUpdate>) -> Self {
        self.ws_broadcast = Some(sender);
        self
    }

    /// Log the values of every accepted reading at info level.
    pub fn with_reading_log(mut self, enabled: bool) -> Self {
        self.log_readings = enabled;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        // A panicking renderer must not take the whole dashboard down with it.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Generation of the currently active source.
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Invalidates every outstanding sink. Returns the new generation.
    pub fn advance_generation(&self) -> u64 {
        let mut inner = self.write();
        inner.generation += 1;
        inner.generation
    }

    /// Sink bound to the current generation.
    pub fn sink(self: &Arc<Self>, source: &'static str) -> SampleSink {
        SampleSink {
            state: Arc::clone(self),
            generation: self.generation(),
            source,
        }
    }

    /// Most recently accepted sample.
    pub fn latest(&self) -> Option<Sample> {
        self.read().window.latest().copied()
    }

    /// Current window contents.
    pub fn chart(&self) -> ChartData {
        self.read().window.snapshot()
    }

    pub fn window_len(&self) -> usize {
        self.read().window.len()
    }

    pub fn connection_status(&self) -> String {
        self.read().connection_status.clone()
    }

    /// Overwrite the connection status regardless of generation.
    ///
    /// Used by the controller itself when it stops or starts a source.
    pub fn reset_connection_status(&self, status: impl Into<String>) {
        self.write().connection_status = status.into();
    }

    fn ingest(&self, generation: u64, sample: Sample, source: &'static str) -> bool {
        let window_len = {
            let mut inner = self.write();
            if inner.generation != generation {
                metrics::counter!("lifeline_samples_rejected_total").increment(1);
                tracing::debug!(
                    source,
                    sink_generation = generation,
                    current_generation = inner.generation,
                    "Dropping sample from stopped source"
                );
                return false;
            }
            inner.window.push(sample);
            let chart = inner.window.snapshot();
            self.renderer.redraw(&chart);
            inner.window.len()
        };

        if self.log_readings {
            tracing::info!(
                source,
                heart_rate = sample.heart_rate,
                systolic = sample.blood_pressure_systolic,
                diastolic = sample.blood_pressure_diastolic,
                spo2 = sample.spo2,
                glucose = ?sample.glucose,
                temperature = sample.temperature,
                "Reading accepted"
            );
        }
        metrics::counter!("lifeline_samples_total", "source" => source).increment(1);
        metrics::gauge!("lifeline_window_len").set(window_len as f64);

        if let Some(sender) = &self.ws_broadcast {
            let update = crate::dashboard::websocket::create_sample_update(
                &sample,
                &classify_sample(&sample),
            );
            // Ignore error if no receivers are listening
            let _ = sender.send(update);
        }
        true
    }

    fn update_connection_status(&self, generation: u64, status: String) -> bool {
        {
            let mut inner = self.write();
            if inner.generation != generation {
                return false;
            }
            inner.connection_status = status.clone();
        }

        if let Some(sender) = &self.ws_broadcast {
            let _ = sender.send(crate::dashboard::websocket::create_connection_update(
                &status,
            ));
        }
        true
    }
}

/// Write handle given to a running source.
#[derive(Clone)]
pub struct SampleSink {
    state: Arc<MonitorState>,
    generation: u64,
    source: &'static str,
}

impl SampleSink {
    /// Appends a sample to the window. Returns `false` if this sink's source
    /// has been stopped, in which case nothing was written.
    pub fn emit(&self, sample: Sample) -> bool {
        self.state.ingest(self.generation, sample, self.source)
    }

    /// The sample most recently accepted by the monitor, from any source.
    pub fn previous(&self) -> Option<Sample> {
        self.state.latest()
    }

    /// Publishes a connection status text. Ignored once the source is stopped.
    pub fn set_connection_status(&self, status: impl Into<String>) -> bool {
        self.state
            .update_connection_status(self.generation, status.into())
    }

    /// Whether this sink still belongs to the active source.
    pub fn is_current(&self) -> bool {
        self.state.generation() == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
