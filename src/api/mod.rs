//! # HTTP API
//!
//! Serves the dashboard and the JSON control surface of the monitor.
//!
//! ## Endpoints
//!
//! - `GET /` - Dashboard page with injected initial state
//! - `GET /assets/*path` - Embedded static assets
//!
//!   Both are left out when `server.dashboard` is off.
//!
//! - `GET /ws` - WebSocket stream of dashboard updates
//! - `GET /api/status` - Controller status and latest classified sample
//! - `GET /api/window` - Current chart window
//! - `POST /api/start` - Start or switch the active source
//! - `POST /api/stop` - Stop the active source
//! - `POST /api/predict` - Request a prediction for the latest sample
//! - `GET /health` - Liveness
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use lifeline::api::{create_router, AppState};
//! use lifeline::config::LifelineConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(LifelineConfig::default());
//! let state = Arc::new(AppState::new(config));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors are returned as:
//! ```json
//! {
//!   "error": {
//!     "message": "Invalid input: spo2 is required",
//!     "type": "invalid_request_error",
//!     "code": "validation_error"
//!   }
//! }
//! ```

pub mod control;
mod error;
mod health;
mod predict;

pub use error::{ApiError, ApiErrorBody};

use crate::config::LifelineConfig;
use crate::controller::ModeController;
use crate::dashboard::types::WebSocketUpdate;
use crate::dashboard::{BroadcastNotifier, BroadcastRenderer};
use crate::metrics::MetricsCollector;
use crate::monitor::MonitorState;
use crate::prediction::{PredictionClient, Predictor};
use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KB).
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<LifelineConfig>,
    pub monitor: Arc<MonitorState>,
    pub controller: Arc<ModeController>,
    pub predictor: Predictor,
    /// Dashboard update channel
    pub ws_broadcast: broadcast::Sender<WebSocketUpdate>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    /// Metrics collector for observability
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Create new application state with the given configuration.
    pub fn new(config: Arc<LifelineConfig>) -> Self {
        let (ws_broadcast, _) = broadcast::channel(config.server.update_buffer.max(1));
        let start_time = Instant::now();

        let monitor = Arc::new(
            MonitorState::new(config.window.capacity)
                .with_reading_log(config.logging.log_readings)
                .with_renderer(Arc::new(BroadcastRenderer::new(ws_broadcast.clone())))
                .with_broadcast(ws_broadcast.clone()),
        );

        let controller = Arc::new(
            ModeController::new(Arc::clone(&monitor), config.controller_settings())
                .with_broadcast(ws_broadcast.clone()),
        );

        let predictor = Predictor::new(PredictionClient::new(
            config.prediction.endpoint.clone(),
            config.prediction_timeout(),
        ))
        .with_notifier(Arc::new(BroadcastNotifier::new(ws_broadcast.clone())));

        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&monitor),
            start_time,
            crate::metrics::setup_or_detached(),
        ));

        Self {
            config,
            monitor,
            controller,
            predictor,
            ws_broadcast,
            start_time,
            metrics_collector,
        }
    }
}

/// Create the main router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let request_timeout = state.config.server.request_timeout();

    let mut router = Router::new();
    if state.config.server.dashboard {
        router = router
            .route("/", get(crate::dashboard::dashboard_handler))
            .route("/assets/*path", get(crate::dashboard::assets_handler));
    }

    router
        .route("/ws", get(crate::dashboard::websocket_handler))
        .route("/api/status", get(control::status))
        .route("/api/window", get(control::window))
        .route("/api/start", post(control::start))
        .route("/api/stop", post(control::stop))
        .route("/api/predict", post(predict::handle))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| crate::logging::make_request_span(request)),
        )
        .with_state(state)
}
