//! HTTP handlers for AQI prediction endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{CityInfo, FeatureSlot, NormalizationPolicy};

use crate::error::AppResult;
use crate::models::{AqiReport, City};
use crate::services::prediction::{AqiClassification, ManualPredictionInput};
use crate::services::PredictionService;
use crate::AppState;

/// List cities available for live analysis
pub async fn list_cities() -> Json<Vec<CityInfo>> {
    Json(City::ALL.into_iter().map(CityInfo::from).collect())
}

/// Model feature schema response
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub features: Vec<FeatureSlot>,
    pub policy: NormalizationPolicy,
}

/// Describe the features the loaded model expects
pub async fn get_model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(ModelInfo {
        features: state.normalizer.schema().slots().to_vec(),
        policy: *state.normalizer.policy(),
    })
}

/// Predict AQI for a city from live pollutant data
pub async fn predict_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> AppResult<Json<AqiReport>> {
    let city = City::from_name(&city)?;
    let service = PredictionService::new(state);
    let report = service.predict_for_city(city).await?;
    Ok(Json(report))
}

/// Predict AQI from manually entered pollutant values
pub async fn predict_manual(
    State(state): State<AppState>,
    Json(input): Json<ManualPredictionInput>,
) -> AppResult<Json<AqiReport>> {
    let service = PredictionService::new(state);
    let report = service.predict_manual(input)?;
    Ok(Json(report))
}

/// Input for classifying a bare AQI value
#[derive(Debug, Deserialize)]
pub struct ClassifyInput {
    pub aqi: f64,
}

/// Classify an AQI value into its category
pub async fn classify_value(Json(input): Json<ClassifyInput>) -> AppResult<Json<AqiClassification>> {
    let classification = PredictionService::classify(input.aqi)?;
    Ok(Json(classification))
}
