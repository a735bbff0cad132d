//! Daily summary entity - Materialized per-location daily aggregate

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::reading::Reading;

/// Conversion factor from metres per second to kilometres per hour
pub const MS_TO_KMH: f64 = 3.6;

/// UTC bounds `[start, end)` of a calendar date
#[must_use]
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let next = date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    let end = next.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, end)
}

/// One aggregate record per (location, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub location: String,
    pub date: NaiveDate,
    /// Mean temperature over every reading (°C)
    pub avg_temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    /// Mean over readings with humidity present, 0 if none
    pub avg_humidity: f64,
    /// Mean over readings with wind speed present, in km/h, 0 if none
    pub avg_wind_speed: f64,
    pub dominant_condition: String,
    /// Number of readings the summary was computed from
    pub sample_count: u32,
}

impl DailySummary {
    /// Reduce a day's readings into a summary
    ///
    /// Readings are expected in ascending timestamp order; that order decides
    /// the dominant-condition tie-break. Returns `None` for an empty slice.
    #[must_use]
    pub fn from_readings(
        location: impl Into<String>,
        date: NaiveDate,
        readings: &[Reading],
    ) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }

        let count = readings.len() as f64;
        let mut sum = 0.0;
        let mut max_temp = f64::NEG_INFINITY;
        let mut min_temp = f64::INFINITY;
        for reading in readings {
            sum += reading.temperature;
            max_temp = max_temp.max(reading.temperature);
            min_temp = min_temp.min(reading.temperature);
        }

        // Floating point error can push the mean a hair outside [min, max]
        let avg_temp = (sum / count).clamp(min_temp, max_temp);

        let avg_humidity = mean_present(readings.iter().map(|r| r.humidity));
        let avg_wind_speed = mean_present(readings.iter().map(|r| r.wind_speed)) * MS_TO_KMH;

        Some(Self {
            location: location.into(),
            date,
            avg_temp,
            max_temp,
            min_temp,
            avg_humidity,
            avg_wind_speed,
            dominant_condition: dominant_condition(readings),
            sample_count: u32::try_from(readings.len()).unwrap_or(u32::MAX),
        })
    }
}

fn mean_present(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let (sum, n) = values
        .flatten()
        .fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Most frequent label; ties go to the label seen first
fn dominant_condition(readings: &[Reading]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for reading in readings {
        match counts
            .iter_mut()
            .find(|(label, _)| *label == reading.condition)
        {
            Some((_, n)) => *n += 1,
            None => counts.push((reading.condition.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, n) in counts {
        if best.is_none_or(|(_, best_n)| n > best_n) {
            best = Some((label, n));
        }
    }
    best.map(|(label, _)| label.to_string()).unwrap_or_default()
}
