//! Application state shared across handlers

use std::sync::Arc;

use application::{
    DailyAggregator, WeatherMonitor,
    ports::{DatabaseHealthPort, ReadingStore, WeatherPort},
};
use domain::Thresholds;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Weather provider for on-demand lookups
    pub weather: Arc<dyn WeatherPort>,
    /// Stored readings
    pub readings: Arc<dyn ReadingStore>,
    /// Daily summary access
    pub aggregator: DailyAggregator,
    /// Polling-cycle monitor
    pub monitor: Arc<WeatherMonitor>,
    /// Database readiness probe
    pub db_health: Arc<dyn DatabaseHealthPort>,
    /// Active breach thresholds
    pub thresholds: Thresholds,
}
