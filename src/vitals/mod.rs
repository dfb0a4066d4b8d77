//! Vital-sign data model: samples, the sliding chart window and status
//! classification.

pub mod classify;
pub mod sample;
pub mod window;

pub use classify::{classify, classify_sample, MetricStatus, Range, Status, ThresholdTable};
pub use sample::{Metric, Sample};
pub use window::{ChartData, Series, Window, DEFAULT_CAPACITY, MAX_CAPACITY};
