//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `database`: SQLite database settings
//! - `weather`: OpenWeatherMap provider
//! - `monitor`: Locations, thresholds, polling cadence
//!
//! Layering is defaults, then an optional `config.toml`, then environment
//! variables such as `SKYWATCH__MONITOR__THRESHOLD_TEMP=40`.

mod database;
mod monitor;
mod server;
mod weather;

use std::{collections::HashSet, fmt, path::Path};

use application::ApplicationError;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use database::DatabaseConfig;
pub use monitor::{MIN_POLL_INTERVAL_MS, MonitorConfig};
pub use server::ServerConfig;
pub use weather::WeatherAppConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SKYWATCH";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Controls how strictly a missing provider key is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - missing credentials only warn
    #[default]
    Development,
    /// Production environment - missing credentials fail startup
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryAppConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "skywatch=info,application=info,infrastructure=info,tower_http=info".to_string()
}

impl Default for TelemetryAppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherAppConfig,

    /// Monitoring loop configuration
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryAppConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file (required) or the default
    /// optional `config.toml`, then apply environment overrides
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., SKYWATCH__SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("monitor.locations")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Check startup invariants
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty location list, a blank or
    /// duplicate location, a non-finite threshold, a polling interval below
    /// one second, a zero fetch timeout, or a missing API key in production
    /// while monitoring is enabled.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let monitor = &self.monitor;

        let locations = monitor.trimmed_locations();
        if locations.is_empty() {
            return Err(ApplicationError::Configuration(
                "monitor.locations must contain at least one location".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(locations.len());
        for (index, location) in locations.iter().enumerate() {
            if location.is_empty() {
                return Err(ApplicationError::Configuration(format!(
                    "monitor.locations[{index}] is blank"
                )));
            }
            // Two entries for one city would store two readings per tick
            if !seen.insert(location.to_lowercase()) {
                return Err(ApplicationError::Configuration(format!(
                    "monitor.locations contains {location} more than once"
                )));
            }
        }

        if !monitor.threshold_temp.is_finite() {
            return Err(ApplicationError::Configuration(format!(
                "monitor.threshold_temp must be finite, got {}",
                monitor.threshold_temp
            )));
        }

        monitor
            .thresholds()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;

        if monitor.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(ApplicationError::Configuration(format!(
                "monitor.poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {}",
                monitor.poll_interval_ms
            )));
        }

        if monitor.fetch_timeout_ms == 0 {
            return Err(ApplicationError::Configuration(
                "monitor.fetch_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if monitor.enabled && !self.weather.has_api_key() {
            if self.environment == Environment::Production {
                return Err(ApplicationError::Configuration(
                    "weather.api_key is required in production while monitoring is enabled"
                        .to_string(),
                ));
            }
            warn!("weather.api_key is not set; provider calls will be rejected");
        }

        Ok(())
    }
}
