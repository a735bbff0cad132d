//! Breach thresholds
//!
//! Process-wide limits used by the breach detector. Built once from
//! configuration at startup and shared immutably afterwards.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Default temperature threshold in Celsius
pub const DEFAULT_THRESHOLD_TEMP: f64 = 35.0;

/// Default condition label that counts as a condition breach
pub const DEFAULT_THRESHOLD_CONDITION: &str = "Rain";

/// Temperature and condition limits for breach detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    temperature: f64,
    condition: String,
}

impl Thresholds {
    /// Create validated thresholds
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature is not finite or the condition
    /// label is blank.
    pub fn new(temperature: f64, condition: impl Into<String>) -> Result<Self, DomainError> {
        if !temperature.is_finite() {
            return Err(DomainError::InvalidMeasurement(format!(
                "threshold temperature must be finite, got {temperature}"
            )));
        }

        let condition = condition.into();
        if condition.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "threshold condition must not be empty".to_string(),
            ));
        }

        Ok(Self {
            temperature,
            condition,
        })
    }

    /// Temperature above which a reading counts as breaching (strictly greater)
    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Condition label that counts as a condition breach (exact match)
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Whether a temperature exceeds the threshold
    #[must_use]
    pub fn exceeds_temperature(&self, temperature: f64) -> bool {
        temperature > self.temperature
    }

    /// Whether a condition label matches the threshold condition
    #[must_use]
    pub fn matches_condition(&self, condition: &str) -> bool {
        condition == self.condition
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_THRESHOLD_TEMP,
            condition: DEFAULT_THRESHOLD_CONDITION.to_string(),
        }
    }
}
