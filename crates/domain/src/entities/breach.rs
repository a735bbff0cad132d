//! Breach evaluation over the two most recent readings of a location

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reading::Reading;
use crate::value_objects::{ReadingId, Thresholds};

/// Decision taken over a pair of consecutive readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BreachAssessment {
    /// Both readings are strictly above the temperature threshold
    pub temperature_breach: bool,
    /// The latest reading already carries the latch
    pub already_latched: bool,
    /// Both readings match the threshold condition label
    pub condition_breach: bool,
}

impl BreachAssessment {
    /// Evaluate the latest reading and the one before it
    #[must_use]
    pub fn evaluate(latest: &Reading, previous: &Reading, thresholds: &Thresholds) -> Self {
        Self {
            temperature_breach: thresholds.exceeds_temperature(latest.temperature)
                && thresholds.exceeds_temperature(previous.temperature),
            already_latched: latest.breached_threshold,
            condition_breach: thresholds.matches_condition(&latest.condition)
                && thresholds.matches_condition(&previous.condition),
        }
    }

    /// A temperature alert is due: breach present and latch not yet set
    #[must_use]
    pub const fn should_alert(&self) -> bool {
        self.temperature_breach && !self.already_latched
    }
}

/// Temperature alert raised for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachAlert {
    pub location: String,
    /// Reading that receives the latch
    pub reading_id: ReadingId,
    pub temperature: f64,
    pub previous_temperature: f64,
    pub threshold: f64,
    pub raised_at: DateTime<Utc>,
}

impl BreachAlert {
    /// Build an alert for the latest reading of a breaching pair
    #[must_use]
    pub fn new(latest: &Reading, previous: &Reading, thresholds: &Thresholds) -> Self {
        Self {
            location: latest.location.clone(),
            reading_id: latest.id,
            temperature: latest.temperature,
            previous_temperature: previous.temperature,
            threshold: thresholds.temperature(),
            raised_at: Utc::now(),
        }
    }

    /// Human-readable alert text
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Temperature in {} exceeded {:.1}°C for two consecutive readings ({:.1}°C, {:.1}°C)",
            self.location, self.threshold, self.previous_temperature, self.temperature
        )
    }
}
