//! Domain error type shared by the normalizer, classifier and model

use thiserror::Error;

/// Errors raised by the pure prediction pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid reading for {pollutant}: {reason}")]
    InvalidReading { pollutant: String, reason: String },

    #[error("Invalid AQI value: {0}")]
    InvalidValue(f64),

    #[error("Missing feature: {0}")]
    MissingFeature(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Invalid feature schema: {0}")]
    InvalidSchema(String),

    #[error("Feature mismatch: expected {expected:?}, got {actual:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Unknown city: {0}")]
    UnknownCity(String),
}

impl DomainError {
    pub fn invalid_reading(pollutant: impl Into<String>, reason: impl Into<String>) -> Self {
        DomainError::InvalidReading {
            pollutant: pollutant.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
