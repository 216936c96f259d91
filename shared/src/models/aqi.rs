//! AQI categories and prediction reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::feature::FeatureVector;
use crate::models::pollutant::PollutantLevels;
use crate::types::GpsCoordinates;
use crate::validation::validate_predicted_aqi;

/// Upper bound (inclusive) of the Good band
pub const GOOD_MAX: f64 = 50.0;
/// Upper bound (inclusive) of the Moderate band
pub const MODERATE_MAX: f64 = 100.0;

/// Air quality category derived from a predicted AQI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AqiCategory {
    /// AQI ≤ 50
    Good,
    /// 50 < AQI ≤ 100
    Moderate,
    /// AQI > 100
    Poor,
}

impl AqiCategory {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
        }
    }

    /// Presentation tag used for styling
    pub fn tag(&self) -> &'static str {
        match self {
            AqiCategory::Good => "good",
            AqiCategory::Moderate => "moderate",
            AqiCategory::Poor => "poor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is satisfactory and poses little or no risk",
            AqiCategory::Moderate => {
                "Air quality is acceptable; unusually sensitive people should limit prolonged exertion"
            }
            AqiCategory::Poor => {
                "Air quality is unhealthy; reduce outdoor activity, especially sensitive groups"
            }
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify a predicted AQI. Ties go to the less severe category.
///
/// Fails with `InvalidValue` for NaN or infinite input.
pub fn classify_aqi(value: f64) -> DomainResult<AqiCategory> {
    let value = validate_predicted_aqi(value)?;
    let category = if value <= GOOD_MAX {
        AqiCategory::Good
    } else if value <= MODERATE_MAX {
        AqiCategory::Moderate
    } else {
        AqiCategory::Poor
    };
    Ok(category)
}

/// Round a predicted AQI to the displayed integer (half to even)
pub fn round_aqi(value: f64) -> DomainResult<i64> {
    let value = validate_predicted_aqi(value)?;
    Ok(value.round_ties_even() as i64)
}

/// Where the pollutant values behind a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    City,
    Manual,
}

/// Result of one prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqiReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: ReadingSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GpsCoordinates>,
    /// Rounded AQI as displayed
    pub aqi: i64,
    /// Raw model output
    pub predicted_aqi: f64,
    pub category: AqiCategory,
    pub label: String,
    pub tag: String,
    pub pollutants: PollutantLevels,
    /// Row that was fed to the model
    pub features: FeatureVector,
    /// Provider's own 1-5 index, when the reading came from the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_at: Option<DateTime<Utc>>,
}
