//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod alert_port;
mod database_health_port;
mod reading_store;
mod summary_store;
mod weather_port;

pub use alert_port::AlertPort;
#[cfg(test)]
pub use alert_port::MockAlertPort;
pub use database_health_port::DatabaseHealthPort;
#[cfg(test)]
pub use database_health_port::MockDatabaseHealthPort;
#[cfg(test)]
pub use reading_store::MockReadingStore;
pub use reading_store::ReadingStore;
#[cfg(test)]
pub use summary_store::MockSummaryStore;
pub use summary_store::SummaryStore;
#[cfg(test)]
pub use weather_port::MockWeatherPort;
pub use weather_port::{CurrentWeather, Forecast, ForecastEntry, WeatherPort};
