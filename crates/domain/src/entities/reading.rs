//! Reading entity - One timestamped weather observation for a location

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::ReadingId;

/// A single weather observation
///
/// Readings are append-only. The only field that may change after the
/// reading is stored is `breached_threshold`, and only from `false` to
/// `true` (see [`Reading::mark_breached`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Unique identifier
    pub id: ReadingId,
    /// Location name the reading belongs to
    pub location: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Wind speed in m/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    /// Apparent temperature in Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    /// Categorical condition label (e.g. "Clear", "Rain")
    pub condition: String,
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Latch set once an alert has been raised for the window ending here
    pub breached_threshold: bool,
}

impl Reading {
    /// Create a new reading observed now
    ///
    /// # Errors
    ///
    /// Returns an error if the location is blank or the temperature is not finite.
    pub fn new(
        location: impl Into<String>,
        temperature: f64,
        condition: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Self::observed_at(location, temperature, condition, Utc::now())
    }

    /// Create a new reading with an explicit observation time
    ///
    /// # Errors
    ///
    /// Returns an error if the location is blank or the temperature is not finite.
    pub fn observed_at(
        location: impl Into<String>,
        temperature: f64,
        condition: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let location = location.into();
        if location.trim().is_empty() {
            return Err(DomainError::InvalidLocation(
                "location must not be empty".to_string(),
            ));
        }
        if !temperature.is_finite() {
            return Err(DomainError::InvalidMeasurement(format!(
                "temperature must be finite, got {temperature}"
            )));
        }

        Ok(Self {
            id: ReadingId::new(),
            location,
            temperature,
            humidity: None,
            wind_speed: None,
            feels_like: None,
            condition: condition.into(),
            timestamp,
            breached_threshold: false,
        })
    }

    /// Attach a relative humidity value
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside 0-100 or not finite.
    pub fn with_humidity(mut self, humidity: f64) -> Result<Self, DomainError> {
        if !(0.0..=100.0).contains(&humidity) {
            return Err(DomainError::InvalidMeasurement(format!(
                "humidity must be within 0-100, got {humidity}"
            )));
        }
        self.humidity = Some(humidity);
        Ok(self)
    }

    /// Attach a wind speed in m/s
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or not finite.
    pub fn with_wind_speed(mut self, wind_speed: f64) -> Result<Self, DomainError> {
        if !wind_speed.is_finite() || wind_speed < 0.0 {
            return Err(DomainError::InvalidMeasurement(format!(
                "wind speed must be a non-negative number, got {wind_speed}"
            )));
        }
        self.wind_speed = Some(wind_speed);
        Ok(self)
    }

    /// Attach an apparent ("feels like") temperature
    #[must_use]
    pub fn with_feels_like(mut self, feels_like: f64) -> Self {
        if feels_like.is_finite() {
            self.feels_like = Some(feels_like);
        }
        self
    }

    /// Set the latch. Returns `true` if the latch flipped, `false` if it was already set.
    pub fn mark_breached(&mut self) -> bool {
        if self.breached_threshold {
            return false;
        }
        self.breached_threshold = true;
        true
    }
}
