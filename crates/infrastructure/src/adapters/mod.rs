//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod log_alert_notifier;
mod weather_adapter;

pub use log_alert_notifier::LogAlertNotifier;
pub use weather_adapter::WeatherAdapter;
