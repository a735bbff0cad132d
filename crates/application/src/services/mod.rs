//! Application services - Use case implementations

mod breach_detector;
mod daily_aggregator;
mod weather_monitor;

pub use breach_detector::{BreachDetector, BreachOutcome};
pub use daily_aggregator::DailyAggregator;
pub use weather_monitor::{
    CycleReport, CycleStage, DEFAULT_FETCH_TIMEOUT, LocationOutcome, MonitorStats,
    MonitorStatsSnapshot, WeatherMonitor, WeatherMonitorConfig,
};
