//! AQI prediction service
//!
//! Runs one request through the pipeline: obtain a reading, normalize it
//! into the model's feature row, predict, classify, and build the report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    classify_aqi, round_aqi, AqiCategory, AqiReport, City, DomainError, PollutantLevels,
    PollutantReading, ReadingSource,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Prediction service over the shared application state
#[derive(Clone)]
pub struct PredictionService {
    state: AppState,
}

/// Input for a manual prediction; unset pollutants take configured defaults
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ManualPredictionInput {
    #[validate(range(min = 0.0, message = "SO2 must not be negative"))]
    pub so2: Option<f64>,
    #[validate(range(min = 0.0, message = "NO2 must not be negative"))]
    pub no2: Option<f64>,
    #[validate(range(min = 0.0, message = "PM10 must not be negative"))]
    pub pm10: Option<f64>,
    #[validate(range(min = 0.0, message = "PM2.5 must not be negative"))]
    pub pm25: Option<f64>,
}

impl ManualPredictionInput {
    fn with_defaults(&self, defaults: PollutantLevels) -> PollutantLevels {
        PollutantLevels {
            so2: self.so2.unwrap_or(defaults.so2),
            no2: self.no2.unwrap_or(defaults.no2),
            pm10: self.pm10.unwrap_or(defaults.pm10),
            pm25: self.pm25.unwrap_or(defaults.pm25),
        }
    }
}

/// Classification of a bare AQI value
#[derive(Debug, Clone, Serialize)]
pub struct AqiClassification {
    pub aqi: f64,
    pub rounded: i64,
    pub category: AqiCategory,
    pub label: String,
    pub tag: String,
    pub description: String,
}

/// Where a reading came from, carried into the report
struct ReadingOrigin {
    source: ReadingSource,
    city: Option<City>,
    provider_index: Option<u8>,
    measured_at: Option<DateTime<Utc>>,
}

impl PredictionService {
    /// Create a new PredictionService instance
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Fetch live pollutant data for a city and predict its AQI
    pub async fn predict_for_city(&self, city: City) -> AppResult<AqiReport> {
        let client = self
            .state
            .pollution
            .as_ref()
            .ok_or(AppError::PollutionServiceUnavailable)?;

        let snapshot = client
            .get_air_pollution(&city.coordinates())
            .await
            .map_err(|e| {
                tracing::error!(city = %city, "Air pollution fetch failed: {}", e);
                e
            })?;

        self.run(
            &snapshot.reading,
            ReadingOrigin {
                source: ReadingSource::City,
                city: Some(city),
                provider_index: snapshot.provider_index,
                measured_at: snapshot.measured_at,
            },
        )
    }

    /// Predict AQI from user-entered pollutant values
    pub fn predict_manual(&self, input: ManualPredictionInput) -> AppResult<AqiReport> {
        input.validate()?;

        let levels = input.with_defaults(self.state.config.manual_defaults.levels());
        self.run(
            &levels.to_reading(),
            ReadingOrigin {
                source: ReadingSource::Manual,
                city: None,
                provider_index: None,
                measured_at: None,
            },
        )
    }

    /// Classify a bare AQI value without running the model
    pub fn classify(value: f64) -> AppResult<AqiClassification> {
        let category = classify_aqi(value)?;
        Ok(AqiClassification {
            aqi: value,
            rounded: round_aqi(value)?,
            category,
            label: category.label().to_string(),
            tag: category.tag().to_string(),
            description: category.description().to_string(),
        })
    }

    fn run(&self, reading: &PollutantReading, origin: ReadingOrigin) -> AppResult<AqiReport> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "prediction",
            %request_id,
            source = ?origin.source,
            city = origin.city.map(|c| c.name())
        );
        let _entered = span.enter();

        let features = self
            .state
            .normalizer
            .normalize(reading)
            .map_err(|e| reading_error(origin.source, e))?;
        tracing::debug!(features = ?features.values(), "Normalized reading");

        let predicted = self.state.model.predict(&features)?;
        let category = classify_aqi(predicted)?;
        let aqi = round_aqi(predicted)?;

        tracing::info!(predicted, aqi, category = %category, "AQI predicted");

        Ok(AqiReport {
            request_id,
            generated_at: Utc::now(),
            source: origin.source,
            city: origin.city.map(|c| c.name().to_string()),
            location: origin.city.map(|c| c.coordinates()),
            aqi,
            predicted_aqi: predicted,
            category,
            label: category.label().to_string(),
            tag: category.tag().to_string(),
            pollutants: PollutantLevels::from_reading(reading),
            features,
            provider_index: origin.provider_index,
            measured_at: origin.measured_at,
        })
    }
}

/// Map a normalization failure to the party responsible for the reading.
///
/// Provider data that cannot be normalized is an upstream failure, not a bad
/// request.
fn reading_error(source: ReadingSource, err: DomainError) -> AppError {
    match (source, err) {
        (ReadingSource::City, err @ DomainError::InvalidReading { .. })
        | (ReadingSource::City, err @ DomainError::MissingFeature(_)) => {
            AppError::FetchFailure(format!("Provider returned an unusable reading: {}", err))
        }
        (_, err) => err.into(),
    }
}
