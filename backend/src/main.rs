//! Air Quality Intelligence - Backend Server
//!
//! Predicts the Air Quality Index for supported cities from live pollutant
//! data, or for pollutant values entered by hand.

use axum::{http::Uri, routing::get, Router};
use shared::{AqiModel, FeatureNormalizer, LinearRegressionModel};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod models;
mod routes;
mod services;

#[cfg(test)]
mod test_support;

pub use config::Config;

use error::{AppError, AppResult};
use external::AirPollutionClient;

/// Application state shared across handlers.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: Arc<dyn AqiModel>,
    pub normalizer: Arc<FeatureNormalizer>,
    /// Absent when no API key is configured; city analysis is then unavailable
    pub pollution: Option<AirPollutionClient>,
}

impl AppState {
    /// Load the model artifact named in the configuration and build the state
    pub fn initialize(config: Config) -> anyhow::Result<Self> {
        tracing::info!("Loading prediction model from {}", config.model.path);
        let json = std::fs::read_to_string(&config.model.path).map_err(|e| {
            anyhow::anyhow!("Failed to read model file {}: {}", config.model.path, e)
        })?;
        let model = LinearRegressionModel::from_json(&json)?;

        Ok(Self::with_model(config, Arc::new(model))?)
    }

    /// Build the state around an already loaded model.
    ///
    /// Resolves the model's declared features against known pollutants, so a
    /// model this service cannot feed is rejected here rather than per request.
    pub fn with_model(config: Config, model: Arc<dyn AqiModel>) -> AppResult<Self> {
        let policy = config.normalization.policy();
        let normalizer = FeatureNormalizer::for_features(model.feature_names(), policy)?;

        tracing::info!(
            features = ?normalizer.schema().names(),
            "Model feature schema resolved"
        );

        let pollution = if config.pollution.api_key.is_empty() {
            tracing::warn!("Air pollution API key not configured; city analysis disabled");
            None
        } else {
            Some(AirPollutionClient::with_base_url(
                config.pollution.api_key.clone(),
                config.pollution.api_endpoint.clone(),
                Duration::from_secs(config.pollution.timeout_secs),
            )?)
        };

        Ok(Self {
            config: Arc::new(config),
            model,
            normalizer: Arc::new(normalizer),
            pollution,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aqi_server=debug,shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Air Quality Intelligence Server");
    tracing::info!("Environment: {}", config.environment);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::initialize(config)?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Air Quality Intelligence API v1.0"
}

/// Unmatched paths
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {}", uri.path()))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
