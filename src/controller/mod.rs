//! Mode controller.
//!
//! Owns the single active metrics source. Starting, switching and stopping
//! are serialized through one async mutex, and a new source is only spawned
//! after the previous one has been invalidated, cancelled and awaited.

pub mod error;

pub use error::{validate_stream_endpoint, ControllerError};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::dashboard::types::WebSocketUpdate;
use crate::monitor::{MonitorState, DISCONNECTED};
use crate::source::{self, clamp_interval, DeviceStreamSource, SimulatedSource, SimulationKind};

/// Status text shown while no source is running.
pub const STOPPED: &str = "Health Predictions stopped";

/// How long a stopping source may take to wind down before it is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Where samples come from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Simulated,
    #[serde(alias = "real_device")]
    #[value(alias = "real-device")]
    Streaming,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Simulated => "simulated",
            Mode::Streaming => "real device",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request to start (or switch to) a source. Unset fields fall back to the
/// controller defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub mode: Mode,
    #[serde(default)]
    pub kind: Option<SimulationKind>,
    #[serde(default)]
    pub interval_ms: Option<u64>,
    /// Overrides the configured device feed endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl StartRequest {
    pub fn simulated(kind: SimulationKind) -> Self {
        Self {
            mode: Mode::Simulated,
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn streaming() -> Self {
        Self {
            mode: Mode::Streaming,
            ..Default::default()
        }
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = Some(interval_ms);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Defaults applied to start requests.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub default_kind: SimulationKind,
    pub default_interval_ms: u64,
    pub stream_endpoint: String,
    pub connect_timeout: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_kind: SimulationKind::Normal,
            default_interval_ms: source::DEFAULT_INTERVAL_MS,
            stream_endpoint: "ws://127.0.0.1:5001".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

struct ActiveSource {
    mode: Mode,
    kind: SimulationKind,
    interval: Duration,
    endpoint: Option<String>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Snapshot of the controller for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerStatus {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SimulationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// False once a running source's task has ended on its own, e.g. the
    /// device closed the connection.
    pub source_alive: bool,
    pub status_text: String,
    pub connection_status: String,
}

/// Starts, switches and stops the active metrics source.
pub struct ModeController {
    monitor: Arc<MonitorState>,
    settings: ControllerSettings,
    active: Mutex<Option<ActiveSource>>,
    ws_broadcast: Option<broadcast::Sender<WebSocketUpdate>>,
}

impl ModeController {
    pub fn new(monitor: Arc<MonitorState>, settings: ControllerSettings) -> Self {
        Self {
            monitor,
            settings,
            active: Mutex::new(None),
            ws_broadcast: None,
        }
    }

    /// Set the WebSocket broadcast sender for status updates.
    pub fn with_broadcast(mut self, sender: broadcast::Sender<WebSocketUpdate>) -> Self {
        self.ws_broadcast = Some(sender);
        self
    }

    pub fn monitor(&self) -> &Arc<MonitorState> {
        &self.monitor
    }

    /// Stops the active source, if any, then starts the requested one.
    pub async fn start(&self, request: StartRequest) -> Result<ControllerStatus, ControllerError> {
        let kind = request.kind.unwrap_or(self.settings.default_kind);
        let interval =
            clamp_interval(request.interval_ms.unwrap_or(self.settings.default_interval_ms));
        let endpoint = match request.mode {
            Mode::Streaming => {
                let endpoint = request
                    .endpoint
                    .unwrap_or_else(|| self.settings.stream_endpoint.clone());
                validate_stream_endpoint(&endpoint)?;
                Some(endpoint)
            }
            Mode::Simulated => None,
        };

        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            self.shutdown(previous).await;
        }

        let cancel = CancellationToken::new();
        let handle = match &endpoint {
            None => {
                let sink = self.monitor.sink(source::SIMULATED);
                SimulatedSource::new(kind, interval).start(sink, cancel.clone())
            }
            Some(endpoint) => {
                let sink = self.monitor.sink(source::STREAM);
                DeviceStreamSource::new(endpoint.clone(), self.settings.connect_timeout)
                    .start(sink, cancel.clone())
            }
        };

        tracing::info!(
            mode = %request.mode,
            kind = %kind,
            interval_ms = interval.as_millis() as u64,
            endpoint = endpoint.as_deref().unwrap_or(""),
            generation = self.monitor.generation(),
            "Source started"
        );

        *active = Some(ActiveSource {
            mode: request.mode,
            kind,
            interval,
            endpoint,
            cancel,
            handle,
        });

        let status = self.describe(active.as_ref());
        drop(active);
        self.broadcast(&status);
        Ok(status)
    }

    /// Same as [`start`](Self::start): the previous source is always stopped
    /// first.
    pub async fn switch_mode(
        &self,
        request: StartRequest,
    ) -> Result<ControllerStatus, ControllerError> {
        self.start(request).await
    }

    /// Stops the active source. Does nothing when already stopped.
    pub async fn stop(&self) -> ControllerStatus {
        let mut active = self.active.lock().await;
        match active.take() {
            Some(previous) => {
                let mode = previous.mode;
                self.shutdown(previous).await;
                tracing::info!(mode = %mode, "Source stopped");
            }
            None => tracing::debug!("Stop requested with no active source"),
        }

        let status = self.describe(None);
        drop(active);
        self.broadcast(&status);
        status
    }

    pub async fn status(&self) -> ControllerStatus {
        let active = self.active.lock().await;
        self.describe(active.as_ref())
    }

    async fn shutdown(&self, mut previous: ActiveSource) {
        // Invalidate the sink before cancelling so nothing the old task
        // emits from here on can reach the window.
        self.monitor.advance_generation();
        previous.cancel.cancel();

        match tokio::time::timeout(SHUTDOWN_GRACE, &mut previous.handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Source task ended abnormally"),
            Err(_) => {
                tracing::warn!(mode = %previous.mode, "Source did not stop in time, aborting");
                previous.handle.abort();
            }
        }

        if previous.mode == Mode::Streaming {
            self.monitor.reset_connection_status(DISCONNECTED);
        }
    }

    fn describe(&self, active: Option<&ActiveSource>) -> ControllerStatus {
        let connection_status = self.monitor.connection_status();
        match active {
            Some(source) => ControllerStatus {
                running: true,
                mode: Some(source.mode),
                kind: (source.mode == Mode::Simulated).then_some(source.kind),
                interval_ms: (source.mode == Mode::Simulated)
                    .then(|| source.interval.as_millis() as u64),
                endpoint: source.endpoint.clone(),
                source_alive: !source.handle.is_finished(),
                status_text: format!(
                    "Running {} Health Predictions ({})",
                    source.kind, source.mode
                ),
                connection_status,
            },
            None => ControllerStatus {
                running: false,
                mode: None,
                kind: None,
                interval_ms: None,
                endpoint: None,
                source_alive: false,
                status_text: STOPPED.to_string(),
                connection_status,
            },
        }
    }

    fn broadcast(&self, status: &ControllerStatus) {
        if let Some(sender) = &self.ws_broadcast {
            let _ = sender.send(crate::dashboard::websocket::create_status_update(status));
        }
    }
}
