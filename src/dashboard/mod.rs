//! Web dashboard module for real-time monitoring
//!
//! Provides an embedded web dashboard served at `/` that displays:
//! - Metric cards with status labels for the latest sample
//! - The sliding-window chart of recent samples
//! - Controls for mode switching and on-demand prediction
//!
//! The page is the chart renderer: it redraws from `window_update`
//! messages pushed over the WebSocket at `/ws`.

pub mod handler;
pub mod types;
pub mod websocket;

pub use handler::{assets_handler, dashboard_handler};
pub use websocket::{websocket_handler, BroadcastNotifier, BroadcastRenderer};
