//! Air pollution API client for fetching pollutant concentrations
//!
//! Integrates with the OpenWeatherMap Air Pollution API

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{is_plausible_concentration, validate_coordinates, GpsCoordinates, PollutantReading};

use crate::error::{AppError, AppResult};

/// Air pollution API client
#[derive(Clone)]
pub struct AirPollutionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Current pollutant concentrations at a location
#[derive(Debug, Clone)]
pub struct AirPollutionSnapshot {
    /// Concentrations keyed by provider identifier (`so2`, `pm2_5`, ...)
    pub reading: PollutantReading,
    /// Provider's own 1-5 air quality index
    pub provider_index: Option<u8>,
    pub measured_at: Option<DateTime<Utc>>,
}

/// OpenWeatherMap API response for air pollution
#[derive(Debug, Deserialize)]
struct OWMAirPollutionResponse {
    list: Option<Vec<OWMAirPollutionItem>>,
}

#[derive(Debug, Deserialize)]
struct OWMAirPollutionItem {
    main: Option<OWMAirMain>,
    #[serde(default)]
    components: HashMap<String, Option<f64>>,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OWMAirMain {
    aqi: u8,
}

impl AirPollutionClient {
    /// Create a new AirPollutionClient; requests give up after `timeout`
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current pollutant concentrations by GPS coordinates
    pub async fn get_air_pollution(
        &self,
        location: &GpsCoordinates,
    ) -> AppResult<AirPollutionSnapshot> {
        validate_coordinates(location.latitude, location.longitude)
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        let url = format!(
            "{}/air_pollution?lat={}&lon={}&appid={}",
            self.base_url, location.latitude, location.longitude, self.api_key
        );

        tracing::debug!(
            latitude = %location.latitude,
            longitude = %location.longitude,
            "Requesting air pollution data"
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::FetchFailure(format!("Air pollution API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::FetchFailure(format!(
                "Air pollution API error: {} - {}",
                status, body
            )));
        }

        let data: OWMAirPollutionResponse = response.json().await.map_err(|e| {
            AppError::FetchFailure(format!("Failed to parse air pollution response: {}", e))
        })?;

        convert_response(data)
    }
}

/// Convert an OpenWeatherMap air pollution response to our format
fn convert_response(data: OWMAirPollutionResponse) -> AppResult<AirPollutionSnapshot> {
    let item = data
        .list
        .and_then(|list| list.into_iter().next())
        .ok_or_else(|| AppError::FetchFailure("Response contains no pollution data".to_string()))?;

    let reading: PollutantReading = item
        .components
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

    for (key, value) in reading.iter() {
        if !is_plausible_concentration(value) {
            tracing::warn!(component = key, value, "Implausible concentration from provider");
        }
    }

    Ok(AirPollutionSnapshot {
        reading,
        provider_index: item.main.map(|m| m.aqi),
        measured_at: item.dt.and_then(|dt| DateTime::from_timestamp(dt, 0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use shared::Pollutant;

    fn parse(body: Value) -> AppResult<AirPollutionSnapshot> {
        convert_response(serde_json::from_value(body).unwrap())
    }

    fn sample_body() -> Value {
        json!({
            "coord": { "lon": 77.1025, "lat": 28.7041 },
            "list": [{
                "main": { "aqi": 4 },
                "components": {
                    "co": 1041.41, "no": 0.31, "no2": 15.0, "o3": 61.51,
                    "so2": 5.0, "pm2_5": 25.0, "pm10": 40.0, "nh3": 7.35
                },
                "dt": 1700000000
            }]
        })
    }

    #[test]
    fn test_convert_extracts_components() {
        let snapshot = parse(sample_body()).unwrap();
        assert_eq!(snapshot.reading.concentration_of(Pollutant::So2), Some(5.0));
        assert_eq!(snapshot.reading.concentration_of(Pollutant::Pm25), Some(25.0));
        assert_eq!(snapshot.reading.get("co"), Some(1041.41));
        assert_eq!(snapshot.provider_index, Some(4));
        assert_eq!(snapshot.measured_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_list_is_fetch_failure() {
        let result = parse(json!({ "cod": 401, "message": "Invalid API key" }));
        assert!(matches!(result, Err(AppError::FetchFailure(_))));
    }

    #[test]
    fn test_empty_list_is_fetch_failure() {
        let result = parse(json!({ "list": [] }));
        assert!(matches!(result, Err(AppError::FetchFailure(_))));
    }

    #[test]
    fn test_null_components_are_skipped() {
        let snapshot = parse(json!({
            "list": [{ "components": { "so2": null, "no2": 3.5 } }]
        }))
        .unwrap();
        assert_eq!(snapshot.reading.get("so2"), None);
        assert_eq!(snapshot.reading.get("no2"), Some(3.5));
        assert_eq!(snapshot.provider_index, None);
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn delhi() -> GpsCoordinates {
        GpsCoordinates::new(Decimal::new(287041, 4), Decimal::new(771025, 4))
    }

    #[tokio::test]
    async fn test_get_air_pollution_over_http() {
        let app = Router::new().route("/air_pollution", get(|| async { Json(sample_body()) }));
        let base_url = serve(app).await;

        let client =
            AirPollutionClient::with_base_url("test-key".into(), base_url, Duration::from_secs(5))
                .unwrap();
        let snapshot = client.get_air_pollution(&delhi()).await.unwrap();
        assert_eq!(snapshot.reading.get("pm10"), Some(40.0));
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_rejected_before_request() {
        // Nothing listens here; a request would surface as FetchFailure
        let client = AirPollutionClient::with_base_url(
            "test-key".into(),
            "http://127.0.0.1:9".into(),
            Duration::from_secs(1),
        )
        .unwrap();

        let location = GpsCoordinates::new(Decimal::from(91), Decimal::ZERO);
        let result = client.get_air_pollution(&location).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_unauthorized_is_fetch_failure() {
        let app = Router::new().route(
            "/air_pollution",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "cod": 401, "message": "Invalid API key" })),
                )
            }),
        );
        let base_url = serve(app).await;

        let client =
            AirPollutionClient::with_base_url("bad-key".into(), base_url, Duration::from_secs(5))
                .unwrap();
        let result = client.get_air_pollution(&delhi()).await;
        assert!(matches!(result, Err(AppError::FetchFailure(_))));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let app = Router::new().route(
            "/air_pollution",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(sample_body())
            }),
        );
        let base_url = serve(app).await;

        let client =
            AirPollutionClient::with_base_url("key".into(), base_url, Duration::from_millis(100))
                .unwrap();
        let result = client.get_air_pollution(&delhi()).await;
        assert!(matches!(result, Err(AppError::FetchFailure(_))));
    }
}
