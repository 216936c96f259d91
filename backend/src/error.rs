//! Error handling for the Air Quality Intelligence service
//!
//! Every failure ends the current request with a JSON error body; none of
//! them affect later requests.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::DomainError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Provider errors
    #[error("Failed to fetch pollutant data: {0}")]
    FetchFailure(String),

    #[error("Air pollution service is not configured")]
    PollutionServiceUnavailable,

    // Input errors
    #[error("Invalid reading for {pollutant}: {reason}")]
    InvalidReading { pollutant: String, reason: String },

    #[error("Invalid AQI value: {0}")]
    InvalidValue(f64),

    #[error("Missing feature: {0}")]
    MissingFeature(String),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown city: {0}")]
    UnknownCity(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Model errors
    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidReading { pollutant, reason } => {
                AppError::InvalidReading { pollutant, reason }
            }
            DomainError::InvalidValue(value) => AppError::InvalidValue(value),
            DomainError::MissingFeature(name) => AppError::MissingFeature(name),
            DomainError::UnknownCity(name) => AppError::UnknownCity(name),
            other => AppError::Model(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        match field_errors.iter().next() {
            Some((field, errs)) => AppError::Validation {
                field: field.to_string(),
                message: errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            },
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::FetchFailure(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "FETCH_FAILURE".to_string(),
                    message: format!("Unable to fetch air pollution data: {}", msg),
                    field: None,
                },
            ),
            AppError::PollutionServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "POLLUTION_SERVICE_UNAVAILABLE".to_string(),
                    message: "Air pollution API key is not configured".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidReading { pollutant, reason } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_READING".to_string(),
                    message: format!("Invalid {} reading: {}", pollutant, reason),
                    field: Some(pollutant.clone()),
                },
            ),
            AppError::InvalidValue(value) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_VALUE".to_string(),
                    message: format!("AQI value {} cannot be classified", value),
                    field: None,
                },
            ),
            AppError::MissingFeature(name) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "MISSING_FEATURE".to_string(),
                    message: format!("Reading has no value for model feature {}", name),
                    field: Some(name.clone()),
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::UnknownCity(name) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "UNKNOWN_CITY".to_string(),
                    message: format!("City {} is not supported", name),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::Model(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "MODEL_ERROR".to_string(),
                    message: format!("Prediction model error: {}", msg),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message: format!("Configuration error: {}", msg),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request failed: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_request_errors() {
        let err: AppError = DomainError::invalid_reading("SO2", "Concentration cannot be negative").into();
        assert_eq!(err.status_and_detail().0, StatusCode::UNPROCESSABLE_ENTITY);

        let err: AppError = DomainError::UnknownCity("Atlantis".to_string()).into();
        assert_eq!(err.status_and_detail().0, StatusCode::NOT_FOUND);

        let err: AppError = DomainError::InvalidValue(f64::NAN).into();
        assert_eq!(err.status_and_detail().1.code, "INVALID_VALUE");
    }

    #[test]
    fn test_model_errors_are_server_errors() {
        let err: AppError = DomainError::FeatureMismatch {
            expected: vec!["SO2".to_string()],
            actual: vec!["NO2".to_string()],
        }
        .into();
        assert_eq!(err.status_and_detail().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_fetch_failure_is_bad_gateway() {
        let (status, detail) = AppError::FetchFailure("timeout".to_string()).status_and_detail();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(detail.code, "FETCH_FAILURE");
    }
}
