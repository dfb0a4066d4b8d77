//! Metrics sources.
//!
//! Two producers write samples into the monitor through a
//! [`SampleSink`](crate::monitor::SampleSink):
//! - [`simulated`]: random readings on a fixed interval
//! - [`stream`]: readings decoded from a device WebSocket feed

pub mod error;
pub mod simulated;
pub mod stream;

pub use error::DecodeError;
pub use simulated::{
    clamp_interval, GenerationProfile, SampleGenerator, SimulatedSource, SimulationKind,
    DEFAULT_INTERVAL_MS, MIN_INTERVAL_MS,
};
pub use stream::{
    close_reason, decode_device_message, ConnectionState, DeviceConnection, DeviceReading,
    DeviceStreamSource, StreamAction, StreamEvent,
};

/// Source label for simulated samples.
pub const SIMULATED: &str = "simulated";

/// Source label for device feed samples.
pub const STREAM: &str = "stream";
