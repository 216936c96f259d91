//! Fixtures shared by the backend's unit tests

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::Router;
use shared::{AqiModel, DomainResult, FeatureVector, MissingFeaturePolicy, NormalizationPolicy};

use crate::config::{Config, NormalizationConfig};
use crate::AppState;

/// Model stub that always predicts the same value
pub struct FixedModel {
    value: f64,
    feature_names: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl FixedModel {
    pub fn returning(value: f64) -> Self {
        Self {
            value,
            feature_names: ["SO2", "NO2", "RSPM/PM10", "PM 2.5"]
                .into_iter()
                .map(String::from)
                .collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of `predict` invocations
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl AqiModel for FixedModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, _features: &FeatureVector) -> DomainResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value)
    }
}

fn normalization_config(policy: NormalizationPolicy) -> NormalizationConfig {
    let (fill_missing, default_value) = match policy.missing {
        MissingFeaturePolicy::FillDefault(value) => (true, value),
        MissingFeaturePolicy::Reject => (false, 0.0),
    };
    NormalizationConfig {
        fill_missing,
        default_value,
        validate_readings: policy.validate_readings,
        allow_unmapped_features: policy.allow_unmapped_features,
    }
}

/// State with no air pollution provider configured
pub fn state_with_model(model: FixedModel, policy: NormalizationPolicy) -> AppState {
    let config = Config {
        normalization: normalization_config(policy),
        ..Config::default()
    };
    AppState::with_model(config, Arc::new(model)).unwrap()
}

/// State whose air pollution provider is `provider`, served on a local port
pub async fn state_with_provider(model: FixedModel, provider: Router) -> AppState {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, provider).await.unwrap();
    });

    let mut config = Config::default();
    config.pollution.api_endpoint = format!("http://{}", addr);
    config.pollution.api_key = "test-key".to_string();
    AppState::with_model(config, Arc::new(model)).unwrap()
}
