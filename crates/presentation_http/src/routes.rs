//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Weather API
        .route("/api/weather/city", get(handlers::weather::current_by_city))
        .route(
            "/api/weather/coords",
            get(handlers::weather::current_by_coordinates),
        )
        .route("/api/weather/current", get(handlers::weather::current_by_city))
        .route("/api/weather/forecast", get(handlers::weather::forecast))
        .route("/api/weather/readings", get(handlers::weather::readings))
        .route("/api/weather/summary", get(handlers::weather::summary))
        .route("/api/weather/summaries", get(handlers::weather::summaries))
        // Monitor API
        .route("/api/monitor/status", get(handlers::monitor::status))
        .route("/api/monitor/run", post(handlers::monitor::run_cycle))
        // Attach state
        .with_state(state)
}
