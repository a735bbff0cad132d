//! Weather service port
//!
//! Defines the interface for weather data retrieval. Values are in
//! provider units: Celsius, percent and m/s.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::Reading;
use domain::errors::DomainError;
use domain::value_objects::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Location name as reported by the provider
    pub location_name: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Apparent/feels-like temperature in Celsius
    pub feels_like: Option<f64>,
    /// Relative humidity in percent (0-100)
    pub humidity: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Condition group label (e.g. "Clear", "Rain")
    pub condition: String,
    /// Longer condition text (e.g. "light rain")
    pub description: Option<String>,
    /// When this data was observed
    pub observed_at: DateTime<Utc>,
}

impl CurrentWeather {
    /// Turn the observation into a reading stored under `location`
    ///
    /// The configured location name is used instead of the provider's name
    /// so every reading of a location shares one key.
    pub fn to_reading(&self, location: &str) -> Result<Reading, DomainError> {
        let mut reading =
            Reading::observed_at(location, self.temperature, &self.condition, self.observed_at)?;
        if let Some(humidity) = self.humidity {
            reading = reading.with_humidity(humidity)?;
        }
        if let Some(wind_speed) = self.wind_speed {
            reading = reading.with_wind_speed(wind_speed)?;
        }
        if let Some(feels_like) = self.feels_like {
            reading = reading.with_feels_like(feels_like);
        }
        Ok(reading)
    }
}

/// One 3-hour forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Start of the forecast slot
    pub time: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Condition group label
    pub condition: String,
}

/// Multi-day forecast for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// City name as reported by the provider
    pub location_name: String,
    /// Time-ordered forecast slots
    pub entries: Vec<ForecastEntry>,
}

/// Port for weather service operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherPort: Send + Sync {
    /// Current weather for a city name
    async fn current_by_city(&self, city: &str) -> Result<CurrentWeather, ApplicationError>;

    /// Current weather at coordinates
    async fn current_by_coordinates(
        &self,
        location: &GeoLocation,
    ) -> Result<CurrentWeather, ApplicationError>;

    /// 5-day / 3-hour forecast for a city name
    async fn forecast_by_city(&self, city: &str) -> Result<Forecast, ApplicationError>;

    /// Check if the weather service is available
    async fn is_available(&self) -> bool;
}
