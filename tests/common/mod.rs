//! Shared helpers for Lifeline integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use lifeline::api::{create_router, AppState};
use lifeline::config::LifelineConfig;
use lifeline::vitals::Sample;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// A device message with every required field and no glucose.
pub const DEVICE_READING: &str = r#"{"heart_rate":72,"blood_pressure_systolic":118,"blood_pressure_diastolic":76,"spo2":98,"temperature":36.6}"#;

// =============================================================================
// Samples and state
// =============================================================================

pub fn make_sample(heart_rate: f64, glucose: Option<f64>) -> Sample {
    Sample {
        timestamp: Utc::now(),
        heart_rate,
        blood_pressure_systolic: 118.0,
        blood_pressure_diastolic: 76.0,
        spo2: 98.0,
        glucose,
        temperature: 36.6,
    }
}

/// Default config pointed at the given prediction endpoint.
pub fn test_config(prediction_endpoint: &str) -> LifelineConfig {
    let mut config = LifelineConfig::default();
    config.prediction.endpoint = prediction_endpoint.to_string();
    config.prediction.timeout_seconds = 2;
    config.stream.connect_timeout_seconds = 2;
    config
}

pub fn create_test_state(config: LifelineConfig) -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(config)))
}

pub fn create_test_app(state: &Arc<AppState>) -> axum::Router {
    create_router(Arc::clone(state))
}

// =============================================================================
// HTTP helpers
// =============================================================================

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// =============================================================================
// Waiting
// =============================================================================

/// Polls `condition` every 10ms until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

pub async fn within<F: Future>(timeout: Duration, future: F) -> F::Output {
    tokio::time::timeout(timeout, future)
        .await
        .expect("timed out")
}

// =============================================================================
// Device feed
// =============================================================================

/// What the fake device does after accepting a connection.
#[derive(Debug, Clone, Default)]
pub struct DeviceScript {
    /// Messages sent in order right after the handshake.
    pub messages: Vec<Message>,
    /// Close frame sent after the messages. `None` keeps the socket open
    /// until the client closes it.
    pub close: Option<(u16, &'static str)>,
}

impl DeviceScript {
    pub fn texts(texts: &[&str]) -> Self {
        Self {
            messages: texts.iter().map(|t| Message::Text(t.to_string())).collect(),
            close: None,
        }
    }

    pub fn then_close(mut self, code: u16, reason: &'static str) -> Self {
        self.close = Some((code, reason));
        self
    }
}

/// Fake device: accepts one WebSocket connection on a random port, plays
/// the script and returns every message it received from the client.
pub async fn spawn_device(script: DeviceScript) -> (String, JoinHandle<Vec<Message>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();

        for message in script.messages {
            socket.send(message).await.unwrap();
        }
        if let Some((code, reason)) = script.close {
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: CloseCode::from(code),
                    reason: reason.into(),
                })))
                .await;
        }

        let mut received = Vec::new();
        while let Some(Ok(message)) = socket.next().await {
            received.push(message);
        }
        received
    });

    (url, handle)
}
