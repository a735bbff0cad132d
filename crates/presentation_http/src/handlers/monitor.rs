//! Monitor status and manual cycle trigger

use application::{CycleReport, MonitorStatsSnapshot};
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

/// Thresholds as reported by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdsView {
    pub temperature: f64,
    pub condition: String,
}

/// Monitor status response
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatusResponse {
    pub locations: Vec<String>,
    pub thresholds: ThresholdsView,
    pub stats: MonitorStatsSnapshot,
}

/// Running counters of the polling monitor
pub async fn status(State(state): State<AppState>) -> Json<MonitorStatusResponse> {
    Json(MonitorStatusResponse {
        locations: state.monitor.locations().to_vec(),
        thresholds: ThresholdsView {
            temperature: state.thresholds.temperature(),
            condition: state.thresholds.condition().to_string(),
        },
        stats: state.monitor.stats().snapshot(),
    })
}

/// Run one monitoring cycle now and return its report
pub async fn run_cycle(State(state): State<AppState>) -> Json<CycleReport> {
    info!("Manual monitoring cycle requested");
    Json(state.monitor.run_cycle().await)
}
