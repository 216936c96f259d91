//! Validation utilities for the Air Quality Intelligence platform

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

// ============================================================================
// Pollutant & Prediction Validations
// ============================================================================

/// Upper bound of any plausible ambient concentration (μg/m³)
pub const MAX_PLAUSIBLE_CONCENTRATION: f64 = 100_000.0;

/// Validate that a concentration is a finite, non-negative number
pub fn validate_concentration(value: f64) -> Result<(), &'static str> {
    if value.is_nan() {
        return Err("Concentration is not a number");
    }
    if value.is_infinite() {
        return Err("Concentration must be finite");
    }
    if value < 0.0 {
        return Err("Concentration cannot be negative");
    }
    Ok(())
}

/// Check whether a concentration is within the range real monitors report
pub fn is_plausible_concentration(value: f64) -> bool {
    validate_concentration(value).is_ok() && value <= MAX_PLAUSIBLE_CONCENTRATION
}

/// Validate a predicted AQI before it is classified or displayed
pub fn validate_predicted_aqi(value: f64) -> DomainResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::InvalidValue(value))
    }
}

// ============================================================================
// Location Validations
// ============================================================================

/// Validate latitude/longitude ranges
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}
