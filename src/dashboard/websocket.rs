//! WebSocket handler for real-time dashboard updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::api::AppState;
use crate::controller::ControllerStatus;
use crate::dashboard::types::{SampleView, UpdateType, WebSocketUpdate};
use crate::monitor::ChartRenderer;
use crate::prediction::{EmergencyAlert, EmergencyNotifier, PredictionReport};
use crate::vitals::{ChartData, MetricStatus, Sample};

/// Largest update forwarded to a client.
const MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Handles WebSocket upgrade requests for dashboard real-time updates
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast channel
    let mut rx = state.ws_broadcast.subscribe();

    // Spawn task to forward broadcast messages to WebSocket
    let send_task = tokio::spawn(async move {
        loop {
            let update = match rx.recv().await {
                Ok(update) => update,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Dashboard client lagging, skipped updates");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match serde_json::to_string(&update) {
                Ok(json) => {
                    if json.len() > MAX_MESSAGE_BYTES {
                        tracing::warn!(
                            "WebSocket message exceeds limit ({}B), skipping",
                            json.len()
                        );
                        continue;
                    }

                    if (sender.send(Message::Text(json)).await).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize WebSocket update: {}", e);
                }
            }
        }
    });

    // Handle incoming messages (ping/pong, close)
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
}

fn update(update_type: UpdateType, data: serde_json::Value) -> WebSocketUpdate {
    WebSocketUpdate { update_type, data }
}

/// Create a new-sample update message
pub fn create_sample_update(sample: &Sample, statuses: &[MetricStatus]) -> WebSocketUpdate {
    update(
        UpdateType::Sample,
        serde_json::to_value(SampleView::new(sample, statuses))
            .unwrap_or(serde_json::Value::Null),
    )
}

/// Create a chart contents update message
pub fn create_window_update(chart: &ChartData) -> WebSocketUpdate {
    update(
        UpdateType::WindowUpdate,
        serde_json::to_value(chart).unwrap_or(serde_json::Value::Null),
    )
}

/// Create a controller status update message
pub fn create_status_update(status: &ControllerStatus) -> WebSocketUpdate {
    update(
        UpdateType::Status,
        serde_json::to_value(status).unwrap_or(serde_json::Value::Null),
    )
}

/// Create a device connection status update message
pub fn create_connection_update(connection_status: &str) -> WebSocketUpdate {
    update(
        UpdateType::Status,
        serde_json::json!({ "connection_status": connection_status }),
    )
}

/// Create a prediction result update message
pub fn create_prediction_update(report: &PredictionReport) -> WebSocketUpdate {
    update(
        UpdateType::Prediction,
        serde_json::to_value(report).unwrap_or(serde_json::Value::Null),
    )
}

/// Create an emergency update message
pub fn create_emergency_update(alert: &EmergencyAlert) -> WebSocketUpdate {
    update(
        UpdateType::Emergency,
        serde_json::to_value(alert).unwrap_or(serde_json::Value::Null),
    )
}

/// Chart renderer that pushes window contents to dashboard clients.
pub struct BroadcastRenderer {
    sender: broadcast::Sender<WebSocketUpdate>,
}

impl BroadcastRenderer {
    pub fn new(sender: broadcast::Sender<WebSocketUpdate>) -> Self {
        Self { sender }
    }
}

impl ChartRenderer for BroadcastRenderer {
    fn redraw(&self, chart: &ChartData) {
        // Ignore error if no receivers are listening
        let _ = self.sender.send(create_window_update(chart));
    }
}

/// Emergency notifier that shows the alert on every open dashboard.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<WebSocketUpdate>,
}

impl BroadcastNotifier {
    pub fn new(sender: broadcast::Sender<WebSocketUpdate>) -> Self {
        Self { sender }
    }
}

impl EmergencyNotifier for BroadcastNotifier {
    fn notify(&self, alert: &EmergencyAlert) {
        tracing::warn!(
            request_id = %alert.request_id,
            condition = %alert.condition,
            "Broadcasting emergency alert"
        );
        let _ = self.sender.send(create_emergency_update(alert));
    }
}
