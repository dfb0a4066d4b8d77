//! Request and response types for the prediction service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::PredictionError;
use crate::vitals::Sample;

/// Readings submitted for prediction.
///
/// Every field is optional so that incomplete input (a dashboard that has
/// not received a reading yet, a partial request body) can be reported as a
/// validation failure instead of a deserialization error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsInput {
    pub heart_rate: Option<f64>,
    pub blood_pressure_systolic: Option<f64>,
    pub blood_pressure_diastolic: Option<f64>,
    pub spo2: Option<f64>,
    pub temperature: Option<f64>,
    pub glucose: Option<f64>,
}

impl From<&Sample> for VitalsInput {
    fn from(sample: &Sample) -> Self {
        Self {
            heart_rate: Some(sample.heart_rate),
            blood_pressure_systolic: Some(sample.blood_pressure_systolic),
            blood_pressure_diastolic: Some(sample.blood_pressure_diastolic),
            spo2: Some(sample.spo2),
            temperature: Some(sample.temperature),
            glucose: sample.glucose,
        }
    }
}

fn required(field: &'static str, value: Option<f64>) -> Result<f64, PredictionError> {
    let value = value.ok_or_else(|| PredictionError::missing(field))?;
    finite(field, value)
}

fn finite(field: &'static str, value: f64) -> Result<f64, PredictionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PredictionError::Validation {
            field,
            reason: format!("must be a finite number, got {}", value),
        })
    }
}

impl VitalsInput {
    /// Checks the input and builds the wire request.
    pub fn validate(&self) -> Result<PredictionRequest, PredictionError> {
        Ok(PredictionRequest {
            heart_rate: required("heart_rate", self.heart_rate)?,
            blood_pressure_systolic: required(
                "blood_pressure_systolic",
                self.blood_pressure_systolic,
            )?,
            blood_pressure_diastolic: required(
                "blood_pressure_diastolic",
                self.blood_pressure_diastolic,
            )?,
            spo2: required("spo2", self.spo2)?,
            temperature: required("temperature", self.temperature)?,
            glucose: self.glucose.map(|g| finite("glucose", g)).transpose()?,
        })
    }
}

/// Body posted to the prediction endpoint. `glucose` is sent as `null`
/// when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub heart_rate: f64,
    pub blood_pressure_systolic: f64,
    pub blood_pressure_diastolic: f64,
    pub spo2: f64,
    pub temperature: f64,
    pub glucose: Option<f64>,
}

/// Risk tier attached to a predicted condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low Risk",
            Severity::Medium => "Medium Risk",
            Severity::High => "High Risk",
            Severity::Critical => "Critical Risk",
            Severity::Unknown => "Info",
        }
    }
}

/// One predicted condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub condition: String,
    pub probability: f64,
    pub severity: Severity,
}

/// Successfully interpreted prediction response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Predictions(Vec<Prediction>),
    NoRisk,
    /// The service answered with `{ "error": ... }`.
    ServiceError(String),
}

impl PredictionOutcome {
    pub fn predictions(&self) -> &[Prediction] {
        match self {
            PredictionOutcome::Predictions(predictions) => predictions,
            _ => &[],
        }
    }

    /// First prediction with critical severity, in response order.
    pub fn first_critical(&self) -> Option<&Prediction> {
        self.predictions()
            .iter()
            .find(|p| p.severity == Severity::Critical)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PredictionOutcome::Predictions(_) => "predictions",
            PredictionOutcome::NoRisk => "no_risk",
            PredictionOutcome::ServiceError(_) => "service_error",
        }
    }
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    predictions: Option<Vec<Prediction>>,
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interprets a success-status response body.
///
/// An `error` member wins over `predictions`.
pub fn decode_response(body: &str) -> Result<PredictionOutcome, PredictionError> {
    let raw: RawResponse = serde_json::from_str(body)
        .map_err(|e| PredictionError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = raw.error.as_ref().filter(|e| !e.is_null()) {
        return Ok(PredictionOutcome::ServiceError(error_text(error)));
    }

    let predictions = raw.predictions.ok_or_else(|| {
        PredictionError::InvalidResponse("missing 'predictions' array".to_string())
    })?;

    if let Some(bad) = predictions
        .iter()
        .find(|p| !(0.0..=1.0).contains(&p.probability))
    {
        return Err(PredictionError::InvalidResponse(format!(
            "probability {} for '{}' is outside [0, 1]",
            bad.probability, bad.condition
        )));
    }

    if predictions.is_empty() {
        Ok(PredictionOutcome::NoRisk)
    } else {
        Ok(PredictionOutcome::Predictions(predictions))
    }
}

/// Best-effort message from a non-success response body.
pub fn upstream_message(body: &str) -> String {
    serde_json::from_str::<RawResponse>(body)
        .ok()
        .and_then(|raw| raw.error)
        .filter(|e| !e.is_null())
        .map(|e| error_text(&e))
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn full_input() -> VitalsInput {
        VitalsInput {
            heart_rate: Some(72.0),
            blood_pressure_systolic: Some(118.0),
            blood_pressure_diastolic: Some(76.0),
            spo2: Some(98.0),
            temperature: Some(36.6),
            glucose: None,
        }
    }

    #[test]
    fn test_validate_complete_input() {
        let request = full_input().validate().unwrap();
        assert_eq!(request.heart_rate, 72.0);
        assert_eq!(request.glucose, None);

        let json = serde_json::to_value(request).unwrap();
        assert!(json["glucose"].is_null());
        assert_eq!(json["blood_pressure_diastolic"], 76.0);
    }

    #[test]
    fn test_validate_missing_blood_pressure() {
        let input = VitalsInput {
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            ..full_input()
        };
        assert_eq!(
            input.validate().unwrap_err(),
            PredictionError::missing("blood_pressure_systolic")
        );
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let input = VitalsInput {
            spo2: Some(f64::NAN),
            ..full_input()
        };
        assert!(matches!(
            input.validate(),
            Err(PredictionError::Validation { field: "spo2", .. })
        ));

        let input = VitalsInput {
            glucose: Some(f64::INFINITY),
            ..full_input()
        };
        assert!(matches!(
            input.validate(),
            Err(PredictionError::Validation { field: "glucose", .. })
        ));
    }

    #[test]
    fn test_partial_body_deserializes() {
        let input: VitalsInput = serde_json::from_str(r#"{"heart_rate": 80}"#).unwrap();
        assert_eq!(input.heart_rate, Some(80.0));
        assert!(input.spo2.is_none());
    }

    #[test]
    fn test_from_sample() {
        let sample = Sample {
            timestamp: Utc::now(),
            heart_rate: 90.0,
            blood_pressure_systolic: 125.0,
            blood_pressure_diastolic: 85.0,
            spo2: 96.0,
            glucose: Some(130.0),
            temperature: 37.0,
        };
        let input = VitalsInput::from(&sample);
        assert_eq!(input.glucose, Some(130.0));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_decode_empty_predictions_is_no_risk() {
        assert_eq!(
            decode_response(r#"{"predictions": []}"#).unwrap(),
            PredictionOutcome::NoRisk
        );
    }

    #[test]
    fn test_decode_predictions() {
        let outcome = decode_response(
            r#"{"predictions":[{"condition":"Tachycardia","probability":0.82,"severity":"high"}]}"#,
        )
        .unwrap();
        let predictions = outcome.predictions();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].condition, "Tachycardia");
        assert_eq!(predictions[0].severity, Severity::High);
        assert!(outcome.first_critical().is_none());
    }

    #[test]
    fn test_decode_error_checked_first() {
        let outcome =
            decode_response(r#"{"error":"model not loaded","predictions":[]}"#).unwrap();
        assert_eq!(
            outcome,
            PredictionOutcome::ServiceError("model not loaded".to_string())
        );
    }

    #[test]
    fn test_decode_unknown_severity() {
        let outcome = decode_response(
            r#"{"predictions":[{"condition":"Error","probability":0.0,"severity":"unknown"}]}"#,
        )
        .unwrap();
        assert_eq!(outcome.predictions()[0].severity, Severity::Unknown);
    }

    #[test]
    fn test_decode_invalid_bodies() {
        assert!(matches!(
            decode_response("<html>"),
            Err(PredictionError::InvalidResponse(_))
        ));
        assert!(matches!(
            decode_response(r#"{"result": "ok"}"#),
            Err(PredictionError::InvalidResponse(_))
        ));
        assert!(matches!(
            decode_response(
                r#"{"predictions":[{"condition":"Fever","probability":1.5,"severity":"low"}]}"#
            ),
            Err(PredictionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(PredictionOutcome::NoRisk).unwrap();
        assert_eq!(json["kind"], "no_risk");

        let json = serde_json::to_value(PredictionOutcome::Predictions(vec![Prediction {
            condition: "Fever".to_string(),
            probability: 0.6,
            severity: Severity::Medium,
        }]))
        .unwrap();
        assert_eq!(json["kind"], "predictions");
        assert_eq!(json["detail"][0]["severity"], "medium");
    }

    #[test]
    fn test_upstream_message() {
        assert_eq!(upstream_message(r#"{"error":"boom"}"#), "boom");
        assert_eq!(upstream_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(upstream_message(""), "Unknown error");
    }
}
