//! Threshold-based status classification for vital signs.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::sample::{Metric, Sample};

/// Qualitative status of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Normal,
    Medium,
    High,
    Critical,
}

impl Status {
    /// Label shown next to a reading on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Normal => "Normal",
            Status::Medium => "Slightly Elevated",
            Status::High => "Elevated",
            Status::Critical => "Critical",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Inclusive membership. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Normal, medium and high ranges for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub normal: Range,
    pub medium: Range,
    pub high: Range,
}

const HEART_RATE: ThresholdTable = ThresholdTable {
    normal: Range::new(60.0, 100.0),
    medium: Range::new(50.0, 110.0),
    high: Range::new(40.0, 120.0),
};

const SYSTOLIC: ThresholdTable = ThresholdTable {
    normal: Range::new(90.0, 120.0),
    medium: Range::new(80.0, 130.0),
    high: Range::new(70.0, 140.0),
};

const DIASTOLIC: ThresholdTable = ThresholdTable {
    normal: Range::new(60.0, 80.0),
    medium: Range::new(50.0, 90.0),
    high: Range::new(40.0, 100.0),
};

const SPO2: ThresholdTable = ThresholdTable {
    normal: Range::new(95.0, 100.0),
    medium: Range::new(92.0, 95.0),
    high: Range::new(88.0, 92.0),
};

const TEMPERATURE: ThresholdTable = ThresholdTable {
    normal: Range::new(36.1, 37.2),
    medium: Range::new(37.3, 38.0),
    high: Range::new(38.1, 39.0),
};

const GLUCOSE: ThresholdTable = ThresholdTable {
    normal: Range::new(70.0, 140.0),
    medium: Range::new(141.0, 180.0),
    high: Range::new(181.0, 250.0),
};

impl ThresholdTable {
    /// Built-in thresholds for a metric.
    pub fn for_metric(metric: Metric) -> &'static ThresholdTable {
        match metric {
            Metric::HeartRate => &HEART_RATE,
            Metric::BloodPressureSystolic => &SYSTOLIC,
            Metric::BloodPressureDiastolic => &DIASTOLIC,
            Metric::Spo2 => &SPO2,
            Metric::Temperature => &TEMPERATURE,
            Metric::Glucose => &GLUCOSE,
        }
    }
}

/// Classifies a value against a threshold table.
///
/// Ranges are tested normal, medium, high; the first inclusive match wins.
/// Anything outside all three (including non-finite input) is critical.
pub fn classify(value: f64, table: &ThresholdTable) -> Status {
    if table.normal.contains(value) {
        Status::Normal
    } else if table.medium.contains(value) {
        Status::Medium
    } else if table.high.contains(value) {
        Status::High
    } else {
        Status::Critical
    }
}

/// Status of one metric of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStatus {
    pub metric: Metric,
    pub value: f64,
    pub status: Status,
}

/// Classifies every metric present in the sample, in chart series order.
pub fn classify_sample(sample: &Sample) -> Vec<MetricStatus> {
    Metric::ALL
        .iter()
        .filter_map(|&metric| {
            sample.value(metric).map(|value| MetricStatus {
                metric,
                value,
                status: classify(value, ThresholdTable::for_metric(metric)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn hr() -> &'static ThresholdTable {
        ThresholdTable::for_metric(Metric::HeartRate)
    }

    #[test]
    fn test_heart_rate_examples() {
        assert_eq!(classify(72.0, hr()), Status::Normal);
        assert_eq!(classify(101.0, hr()), Status::Medium);
        assert_eq!(classify(115.0, hr()), Status::High);
        assert_eq!(classify(200.0, hr()), Status::Critical);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(classify(60.0, hr()), Status::Normal);
        assert_eq!(classify(100.0, hr()), Status::Normal);
        assert_eq!(classify(50.0, hr()), Status::Medium);
        assert_eq!(classify(110.0, hr()), Status::Medium);
        assert_eq!(classify(40.0, hr()), Status::High);
        assert_eq!(classify(120.0, hr()), Status::High);
    }

    #[test]
    fn test_just_outside_outermost_range_is_critical() {
        assert_eq!(classify(39.999, hr()), Status::Critical);
        assert_eq!(classify(120.001, hr()), Status::Critical);
        assert_eq!(classify(0.0, hr()), Status::Critical);
    }

    #[test]
    fn test_overlapping_boundary_prefers_earlier_range() {
        // spo2 95 is the top of medium and the bottom of normal
        let spo2 = ThresholdTable::for_metric(Metric::Spo2);
        assert_eq!(classify(95.0, spo2), Status::Normal);
        assert_eq!(classify(92.0, spo2), Status::Medium);
        assert_eq!(classify(90.0, spo2), Status::High);
        assert_eq!(classify(87.0, spo2), Status::Critical);
    }

    #[test]
    fn test_gap_between_ranges_is_critical() {
        // temperature ranges leave gaps at one-decimal resolution
        let temp = ThresholdTable::for_metric(Metric::Temperature);
        assert_eq!(classify(37.25, temp), Status::Critical);
        assert_eq!(classify(35.0, temp), Status::Critical);
        assert_eq!(classify(38.5, temp), Status::High);
    }

    #[test]
    fn test_non_finite_is_critical() {
        assert_eq!(classify(f64::NAN, hr()), Status::Critical);
        assert_eq!(classify(f64::INFINITY, hr()), Status::Critical);
        assert_eq!(classify(f64::NEG_INFINITY, hr()), Status::Critical);
    }

    #[test]
    fn test_classify_sample_skips_missing_glucose() {
        let sample = Sample {
            timestamp: Utc::now(),
            heart_rate: 101.0,
            blood_pressure_systolic: 118.0,
            blood_pressure_diastolic: 76.0,
            spo2: 98.0,
            glucose: None,
            temperature: 36.6,
        };

        let statuses = classify_sample(&sample);
        assert_eq!(statuses.len(), 5);
        assert!(statuses.iter().all(|s| s.metric != Metric::Glucose));
        assert_eq!(statuses[0].metric, Metric::HeartRate);
        assert_eq!(statuses[0].status, Status::Medium);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(Status::Normal.label(), "Normal");
        assert_eq!(Status::Medium.label(), "Slightly Elevated");
        assert_eq!(Status::High.label(), "Elevated");
        assert_eq!(Status::Critical.to_string(), "Critical");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Classification agrees with range membership for every metric.
            #[test]
            fn prop_classify_consistent_with_ranges(value in -50.0f64..400.0, idx in 0usize..6) {
                let metric = Metric::ALL[idx];
                let table = ThresholdTable::for_metric(metric);
                let status = classify(value, table);

                let expected = if table.normal.contains(value) {
                    Status::Normal
                } else if table.medium.contains(value) {
                    Status::Medium
                } else if table.high.contains(value) {
                    Status::High
                } else {
                    Status::Critical
                };
                prop_assert_eq!(status, expected);
                prop_assert_eq!(status, classify(value, table));
            }
        }
    }
}
