//! Human-readable texts for prediction results.

use super::types::PredictionOutcome;

pub const NO_RISK_MESSAGE: &str =
    "All current readings appear within acceptable ranges. No notable health risks detected at this time.";

const EXPLANATIONS: &[(&str, &str)] = &[
    ("Hypertension", "There is a chance of elevated blood pressure, which may indicate hypertension. Monitoring is advised."),
    ("Hypoxia", "There is a chance of reduced oxygen levels, which may indicate hypoxia. Consider consulting a healthcare professional."),
    ("Hyperglycemia", "There is a chance of elevated blood sugar levels, which may indicate hyperglycemia. Dietary adjustments and monitoring are recommended."),
    ("Fever", "There is a chance of elevated body temperature, which may indicate a fever. Rest and hydration are advised."),
    ("Bradycardia", "There is a chance of a slow heart rate, which may indicate bradycardia. Further evaluation may be necessary."),
    ("Tachycardia", "There is a chance of a fast heart rate, which may indicate tachycardia. Avoiding stimulants and monitoring are recommended."),
    ("Hypothermia", "There is a chance of reduced body temperature, which may indicate hypothermia. Warming up and seeking medical advice are advised."),
    ("Hyperthermia", "There is a chance of very high body temperature, which may indicate hyperthermia. Immediate medical attention is required."),
    ("Hypoglycemia", "There is a chance of low blood sugar levels, which may indicate hypoglycemia. Consuming a small amount of sugar is recommended."),
    ("Normal", NO_RISK_MESSAGE),
];

/// Explanation for a known condition. Matching is case-sensitive.
pub fn explanation(condition: &str) -> Option<&'static str> {
    EXPLANATIONS
        .iter()
        .find(|(name, _)| *name == condition)
        .map(|(_, text)| *text)
}

pub fn insight(condition: &str) -> String {
    match explanation(condition) {
        Some(text) => text.to_string(),
        None => format!(
            "Possible risk of {}. Consult a healthcare professional.",
            condition
        ),
    }
}

/// One insight per predicted condition, or the no-risk message.
pub fn insights(outcome: &PredictionOutcome) -> Vec<String> {
    match outcome {
        PredictionOutcome::Predictions(predictions) => {
            predictions.iter().map(|p| insight(&p.condition)).collect()
        }
        PredictionOutcome::NoRisk => vec![NO_RISK_MESSAGE.to_string()],
        PredictionOutcome::ServiceError(_) => Vec::new(),
    }
}

pub fn emergency_message(condition: &str) -> String {
    format!(
        "Critical health risk detected: {}. Please seek immediate medical attention or call emergency services.",
        condition
    )
}
