//! Lifeline - vital-sign monitor
//!
//! This library provides the sliding chart window, status classification,
//! simulated and device-streamed sample sources, the mode controller and the
//! prediction client behind the Lifeline dashboard.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod prediction;
pub mod source;
pub mod vitals;
