//! Simulated metrics source.
//!
//! Generates pseudo-random readings on a fixed schedule. Each
//! [`SimulationKind`] selects the nominal ranges or swaps in an abnormal
//! range for one vital sign.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::monitor::SampleSink;
use crate::vitals::Sample;

/// Shortest allowed sample interval.
pub const MIN_INTERVAL_MS: u64 = 1000;

/// Default sample interval.
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Scenario driving the simulated readings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    #[default]
    Normal,
    ElevatedHeartRate,
    LowBloodPressure,
    HighGlucose,
    ElevatedTemperature,
}

impl SimulationKind {
    pub fn label(&self) -> &'static str {
        match self {
            SimulationKind::Normal => "Normal",
            SimulationKind::ElevatedHeartRate => "Elevated Heart Rate",
            SimulationKind::LowBloodPressure => "Low Blood Pressure",
            SimulationKind::HighGlucose => "High Glucose",
            SimulationKind::ElevatedTemperature => "Elevated Temperature",
        }
    }

    /// Generation ranges for this scenario.
    pub fn profile(&self) -> GenerationProfile {
        let mut profile = GenerationProfile::NOMINAL;
        match self {
            SimulationKind::Normal => {}
            SimulationKind::ElevatedHeartRate => profile.heart_rate = (100, 120),
            SimulationKind::LowBloodPressure => {
                profile.systolic = (80, 100);
                profile.diastolic = (50, 70);
            }
            SimulationKind::HighGlucose => profile.glucose = (150, 200),
            SimulationKind::ElevatedTemperature => profile.temperature = (37.6, 39.0),
        }
        profile
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SimulationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "normal" => Ok(SimulationKind::Normal),
            "elevated_heart_rate" => Ok(SimulationKind::ElevatedHeartRate),
            "low_blood_pressure" => Ok(SimulationKind::LowBloodPressure),
            "high_glucose" => Ok(SimulationKind::HighGlucose),
            "elevated_temperature" => Ok(SimulationKind::ElevatedTemperature),
            _ => Err(format!("Invalid simulation kind: {}", s)),
        }
    }
}

/// Inclusive generation ranges. Integer ranges for everything except
/// temperature, which is drawn as a float and rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProfile {
    pub heart_rate: (i64, i64),
    pub systolic: (i64, i64),
    pub diastolic: (i64, i64),
    pub spo2: (i64, i64),
    pub glucose: (i64, i64),
    pub temperature: (f64, f64),
}

impl GenerationProfile {
    pub const NOMINAL: GenerationProfile = GenerationProfile {
        heart_rate: (60, 100),
        systolic: (110, 130),
        diastolic: (70, 90),
        spo2: (95, 100),
        glucose: (70, 140),
        temperature: (36.0, 37.5),
    };
}

/// Clamps a requested interval to the allowed minimum.
pub fn clamp_interval(interval_ms: u64) -> Duration {
    Duration::from_millis(interval_ms.max(MIN_INTERVAL_MS))
}

/// Random sample generator for one scenario.
pub struct SampleGenerator<R = StdRng> {
    kind: SimulationKind,
    profile: GenerationProfile,
    rng: R,
}

impl SampleGenerator<StdRng> {
    pub fn new(kind: SimulationKind) -> Self {
        Self::with_rng(kind, StdRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic generator for reproducible runs.
    pub fn seeded(kind: SimulationKind, seed: u64) -> Self {
        Self::with_rng(kind, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SampleGenerator<R> {
    pub fn with_rng(kind: SimulationKind, rng: R) -> Self {
        Self {
            kind,
            profile: kind.profile(),
            rng,
        }
    }

    pub fn kind(&self) -> SimulationKind {
        self.kind
    }

    fn int_in(&mut self, (low, high): (i64, i64)) -> f64 {
        self.rng.random_range(low..=high) as f64
    }

    fn one_decimal_in(&mut self, (low, high): (f64, f64)) -> f64 {
        let value: f64 = self.rng.random_range(low..=high);
        (value * 10.0).round() / 10.0
    }

    /// Draws the next sample, timestamped now.
    pub fn next_sample(&mut self) -> Sample {
        let profile = self.profile;
        Sample {
            timestamp: Utc::now(),
            heart_rate: self.int_in(profile.heart_rate),
            blood_pressure_systolic: self.int_in(profile.systolic),
            blood_pressure_diastolic: self.int_in(profile.diastolic),
            spo2: self.int_in(profile.spo2),
            glucose: Some(self.int_in(profile.glucose)),
            temperature: self.one_decimal_in(profile.temperature),
        }
    }
}

/// Interval-driven sample producer.
pub struct SimulatedSource {
    generator: SampleGenerator,
    interval: Duration,
}

impl SimulatedSource {
    pub fn new(kind: SimulationKind, interval: Duration) -> Self {
        Self::with_generator(SampleGenerator::new(kind), interval)
    }

    pub fn with_generator(generator: SampleGenerator, interval: Duration) -> Self {
        Self {
            generator,
            interval,
        }
    }

    /// Starts emitting: one sample immediately, then one per interval until
    /// `cancel_token` fires or the sink is invalidated.
    pub fn start(self, sink: SampleSink, cancel_token: CancellationToken) -> JoinHandle<()> {
        let Self {
            mut generator,
            interval,
        } = self;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                kind = %generator.kind(),
                interval_ms = interval.as_millis() as u64,
                "Simulated source started"
            );

            loop {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Simulated source stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !sink.emit(generator.next_sample()) {
                            tracing::debug!("Simulated source superseded, exiting");
                            break;
                        }
                    }
                }
            }
        })
    }
}
