//! Fixed-capacity sliding window of recent samples.
//!
//! Holds the most recent N samples for charting, evicting the oldest first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sample::{Metric, Sample};

/// Default number of points kept on the chart.
pub const DEFAULT_CAPACITY: usize = 20;

/// Largest window whose full chart still fits in one dashboard update.
pub const MAX_CAPACITY: usize = 300;

/// FIFO buffer of the most recent samples.
#[derive(Debug, Clone)]
pub struct Window {
    samples: VecDeque<Sample>,
    capacity: usize,
}

/// One value series of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub metric: Metric,
    pub label: String,
    /// `None` where the sample had no reading (glucose from the device feed)
    pub values: Vec<Option<f64>>,
}

/// Window contents laid out for the chart renderer.
///
/// Every series has exactly as many points as `timestamps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub capacity: usize,
    pub timestamps: Vec<DateTime<Utc>>,
    pub series: Vec<Series>,
}

impl ChartData {
    /// Series for one metric.
    pub fn series(&self, metric: Metric) -> Option<&Series> {
        self.series.iter().find(|s| s.metric == metric)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

impl Window {
    /// Creates an empty window. Capacity is clamped to `1..=MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_CAPACITY);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest when the window is full.
    ///
    /// Returns the evicted sample, if any.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    /// Samples in chronological (push) order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Builds the chart view: the shared timestamp series plus one value
    /// series per metric.
    pub fn snapshot(&self) -> ChartData {
        let timestamps = self.samples.iter().map(|s| s.timestamp).collect();
        let series = Metric::ALL
            .iter()
            .map(|&metric| Series {
                metric,
                label: metric.label().to_string(),
                values: self.samples.iter().map(|s| s.value(metric)).collect(),
            })
            .collect();

        ChartData {
            capacity: self.capacity,
            timestamps,
            series,
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_at(secs: i64, heart_rate: f64) -> Sample {
        Sample {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            heart_rate,
            blood_pressure_systolic: 120.0,
            blood_pressure_diastolic: 80.0,
            spo2: 98.0,
            glucose: Some(100.0),
            temperature: 36.6,
        }
    }

    #[test]
    fn test_new_window_is_empty() {
        let window = Window::new(20);
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 20);
        assert!(window.latest().is_none());
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let mut window = Window::new(0);
        assert_eq!(window.capacity(), 1);
        window.push(sample_at(1, 70.0));
        window.push(sample_at(2, 71.0));
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest().unwrap().heart_rate, 71.0);
    }

    #[test]
    fn test_push_evicts_oldest_fifo() {
        let mut window = Window::new(20);
        for i in 0..25 {
            window.push(sample_at(i, 60.0 + i as f64));
        }

        assert_eq!(window.len(), 20);
        let first = window.iter().next().unwrap();
        assert_eq!(first.timestamp.timestamp(), 5);
        assert_eq!(window.latest().unwrap().timestamp.timestamp(), 24);
    }

    #[test]
    fn test_push_returns_evicted_sample() {
        let mut window = Window::new(2);
        assert!(window.push(sample_at(1, 70.0)).is_none());
        assert!(window.push(sample_at(2, 71.0)).is_none());
        let evicted = window.push(sample_at(3, 72.0)).unwrap();
        assert_eq!(evicted.heart_rate, 70.0);
    }

    #[test]
    fn test_snapshot_series_aligned_with_timestamps() {
        let mut window = Window::new(5);
        for i in 0..3 {
            window.push(sample_at(i, 80.0 + i as f64));
        }

        let chart = window.snapshot();
        assert_eq!(chart.capacity, 5);
        assert_eq!(chart.len(), 3);
        assert_eq!(chart.series.len(), 6);
        for series in &chart.series {
            assert_eq!(series.values.len(), chart.timestamps.len());
        }

        let hr = chart.series(Metric::HeartRate).unwrap();
        assert_eq!(hr.values, vec![Some(80.0), Some(81.0), Some(82.0)]);
    }

    #[test]
    fn test_snapshot_keeps_missing_glucose_as_gap() {
        let mut window = Window::new(5);
        let mut s = sample_at(1, 70.0);
        s.glucose = None;
        window.push(s);

        let chart = window.snapshot();
        assert_eq!(chart.series(Metric::Glucose).unwrap().values, vec![None]);
    }

    #[test]
    fn test_oversized_capacity_clamped() {
        let window = Window::new(MAX_CAPACITY * 10);
        assert_eq!(window.capacity(), MAX_CAPACITY);
    }
}
