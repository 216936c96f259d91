//! WebAssembly module for the Air Quality Intelligence platform
//!
//! Provides client-side computation for:
//! - AQI category classification
//! - Feature normalization against a model's declared features
//! - Linear model prediction for offline use

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Category label for an AQI value ("Good", "Moderate" or "Poor")
#[wasm_bindgen]
pub fn classify_aqi_label(aqi: f64) -> Result<String, JsValue> {
    let category = classify_aqi(aqi).map_err(to_js_error)?;
    Ok(category.label().to_string())
}

/// Presentation tag for an AQI value ("good", "moderate" or "poor")
#[wasm_bindgen]
pub fn classify_aqi_tag(aqi: f64) -> Result<String, JsValue> {
    let category = classify_aqi(aqi).map_err(to_js_error)?;
    Ok(category.tag().to_string())
}

/// Rounded AQI as displayed
#[wasm_bindgen]
pub fn display_aqi(aqi: f64) -> Result<f64, JsValue> {
    round_aqi(aqi).map(|v| v as f64).map_err(to_js_error)
}

fn normalize_json(reading_json: &str, feature_names_json: &str) -> Result<FeatureVector, String> {
    let reading: PollutantReading = serde_json::from_str(reading_json)
        .map_err(|e| format!("Invalid reading JSON: {}", e))?;
    let feature_names: Vec<String> = serde_json::from_str(feature_names_json)
        .map_err(|e| format!("Invalid feature names JSON: {}", e))?;

    let normalizer = FeatureNormalizer::for_features(&feature_names, NormalizationPolicy::interactive())
        .map_err(|e| e.to_string())?;
    let features = normalizer.normalize(&reading).map_err(|e| e.to_string())?;

    for slot in normalizer.schema().slots() {
        if !reading.iter().any(|(key, _)| slot.matches_key(key)) {
            web_sys::console::warn_1(&format!("Missing feature {} filled with 0", slot.name).into());
        }
    }

    Ok(features)
}

/// Build the model input row for a reading.
///
/// `reading_json` is an object of pollutant identifier to concentration,
/// `feature_names_json` the model's declared feature names in order.
#[wasm_bindgen]
pub fn normalize_reading(reading_json: &str, feature_names_json: &str) -> Result<Float64Array, JsValue> {
    let features = normalize_json(reading_json, feature_names_json).map_err(to_js_error)?;
    Ok(Float64Array::from(features.values().as_slice()))
}

/// Predict AQI with a linear model artifact and classify it
///
/// Returns a JSON object `{ aqi, predicted_aqi, label, tag }`.
#[wasm_bindgen]
pub fn predict_aqi(model_json: &str, reading_json: &str) -> Result<String, JsValue> {
    let model = LinearRegressionModel::from_json(model_json).map_err(to_js_error)?;
    let feature_names = serde_json::to_string(model.feature_names()).map_err(to_js_error)?;
    let features = normalize_json(reading_json, &feature_names).map_err(to_js_error)?;

    let predicted = model.predict(&features).map_err(to_js_error)?;
    let category = classify_aqi(predicted).map_err(to_js_error)?;
    let aqi = round_aqi(predicted).map_err(to_js_error)?;

    Ok(serde_json::json!({
        "aqi": aqi,
        "predicted_aqi": predicted,
        "label": category.label(),
        "tag": category.tag(),
    })
    .to_string())
}
