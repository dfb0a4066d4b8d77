//! Timestamped vital-sign readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six charted vital-sign series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    HeartRate,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    Spo2,
    Glucose,
    Temperature,
}

impl Metric {
    /// All metrics in chart series order.
    pub const ALL: [Metric; 6] = [
        Metric::HeartRate,
        Metric::BloodPressureSystolic,
        Metric::BloodPressureDiastolic,
        Metric::Spo2,
        Metric::Glucose,
        Metric::Temperature,
    ];

    /// Human-readable series label.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::HeartRate => "Heart Rate",
            Metric::BloodPressureSystolic => "Blood Pressure (Systolic)",
            Metric::BloodPressureDiastolic => "Blood Pressure (Diastolic)",
            Metric::Spo2 => "SpO₂",
            Metric::Glucose => "Glucose",
            Metric::Temperature => "Temperature",
        }
    }

    /// Display unit.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::HeartRate => "BPM",
            Metric::BloodPressureSystolic | Metric::BloodPressureDiastolic => "mmHg",
            Metric::Spo2 => "SpO2%",
            Metric::Glucose => "mg/dL",
            Metric::Temperature => "°C",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A timestamped set of vital-sign readings.
///
/// Samples are immutable once built; a new reading always produces a new
/// `Sample`. Glucose is optional because the bedside device does not report
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub heart_rate: f64,
    pub blood_pressure_systolic: f64,
    pub blood_pressure_diastolic: f64,
    pub spo2: f64,
    pub glucose: Option<f64>,
    pub temperature: f64,
}

impl Sample {
    /// Value of a single metric, `None` only for absent glucose.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::HeartRate => Some(self.heart_rate),
            Metric::BloodPressureSystolic => Some(self.blood_pressure_systolic),
            Metric::BloodPressureDiastolic => Some(self.blood_pressure_diastolic),
            Metric::Spo2 => Some(self.spo2),
            Metric::Glucose => self.glucose,
            Metric::Temperature => Some(self.temperature),
        }
    }

    /// Blood pressure formatted as `systolic/diastolic`.
    pub fn blood_pressure(&self) -> String {
        format!(
            "{}/{}",
            self.blood_pressure_systolic, self.blood_pressure_diastolic
        )
    }
}
