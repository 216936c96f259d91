//! Route definitions for the Air Quality Intelligence service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/model", get(handlers::get_model_info))
        .route("/classify", post(handlers::classify_value))
        // City analysis (live provider data)
        .nest("/cities", city_routes())
        // Manual predictions
        .route("/predictions", post(handlers::predict_manual))
}

/// City routes
fn city_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_cities))
        .route("/:city/aqi", get(handlers::predict_city))
}
