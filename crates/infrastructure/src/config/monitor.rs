//! Monitoring loop configuration: locations, thresholds, timing.

use std::time::Duration;

use application::WeatherMonitorConfig;
use domain::{
    DomainError, Thresholds,
    value_objects::{DEFAULT_THRESHOLD_CONDITION, DEFAULT_THRESHOLD_TEMP},
};
use serde::{Deserialize, Serialize};

use super::default_true;

/// Smallest accepted polling interval
pub const MIN_POLL_INTERVAL_MS: u64 = 1000;

/// Weather monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Run the periodic polling task
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Temperature in Celsius above which two consecutive readings alert
    #[serde(default = "default_threshold_temp")]
    pub threshold_temp: f64,

    /// Condition label that counts as a condition breach
    #[serde(default = "default_threshold_condition")]
    pub threshold_condition: String,

    /// Time between monitoring cycles in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Per-location fetch timeout in milliseconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,

    /// Monitored city names
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
}

const fn default_threshold_temp() -> f64 {
    DEFAULT_THRESHOLD_TEMP
}

fn default_threshold_condition() -> String {
    DEFAULT_THRESHOLD_CONDITION.to_string()
}

const fn default_poll_interval() -> u64 {
    300_000
}

const fn default_fetch_timeout() -> u64 {
    15_000
}

fn default_locations() -> Vec<String> {
    ["Delhi", "Mumbai", "Chennai", "Bangalore", "Kolkata", "Hyderabad"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_temp: default_threshold_temp(),
            threshold_condition: default_threshold_condition(),
            poll_interval_ms: default_poll_interval(),
            fetch_timeout_ms: default_fetch_timeout(),
            locations: default_locations(),
        }
    }
}

impl MonitorConfig {
    /// Breach thresholds for the detector
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature is not finite or the condition is blank.
    pub fn thresholds(&self) -> Result<Thresholds, DomainError> {
        Thresholds::new(self.threshold_temp, self.threshold_condition.clone())
    }

    /// Interval between monitoring cycles
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Location names with surrounding whitespace removed
    ///
    /// List values from the environment (`"Delhi, Mumbai"`) keep the space
    /// after the separator; readings are stored under the trimmed name.
    #[must_use]
    pub fn trimmed_locations(&self) -> Vec<String> {
        self.locations.iter().map(|l| l.trim().to_string()).collect()
    }

    /// Monitor service configuration
    #[must_use]
    pub fn monitor_config(&self) -> WeatherMonitorConfig {
        WeatherMonitorConfig {
            locations: self.trimmed_locations(),
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
        }
    }
}
