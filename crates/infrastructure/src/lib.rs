//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: SQLite stores via
//! sqlx, the OpenWeatherMap adapter, the log alert sink, configuration
//! loading and tracing setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, DatabaseConfig, Environment, MonitorConfig, ServerConfig, TelemetryAppConfig,
    WeatherAppConfig,
};
pub use persistence::{
    AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError, SqliteDatabaseHealth,
    SqliteReadingStore, SqliteSummaryStore,
};
pub use telemetry::{LogFormat, TelemetryError, init_tracing};
