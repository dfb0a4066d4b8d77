//! Error types for device feed decoding.

use thiserror::Error;

/// Reasons an inbound device message is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field '{field}' is not a number: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("binary message is not valid UTF-8")]
    InvalidUtf8,
}

impl DecodeError {
    /// Short label used for the dropped-message counter.
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::Json(_) | DecodeError::NotAnObject | DecodeError::InvalidUtf8 => {
                "parse"
            }
            DecodeError::MissingField(_) => "missing_field",
            DecodeError::InvalidField { .. } => "invalid_field",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = DecodeError::MissingField("spo2");
        assert_eq!(err.to_string(), "missing required field: spo2");
        assert_eq!(err.reason(), "missing_field");
    }

    #[test]
    fn test_invalid_field_display() {
        let err = DecodeError::InvalidField {
            field: "heart_rate",
            value: "\"fast\"".to_string(),
        };
        assert_eq!(err.to_string(), "field 'heart_rate' is not a number: \"fast\"");
    }
}
