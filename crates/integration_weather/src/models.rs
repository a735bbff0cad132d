//! OpenWeatherMap wire models and normalized results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Normalized results
// ============================================================================

/// Current weather conditions, metric units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Location name reported by the provider
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Apparent temperature in Celsius
    pub feels_like: Option<f64>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Condition group (`weather[0].main`)
    pub condition: String,
    /// Condition text (`weather[0].description`)
    pub description: Option<String>,
    /// Observation time (`dt`)
    pub observed_at: DateTime<Utc>,
}

/// One 3-hour forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub condition: String,
}

/// 5-day / 3-hour forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    /// Slots in provider order (ascending time)
    pub entries: Vec<ForecastEntry>,
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    #[serde(default)]
    pub name: String,
    pub dt: i64,
    pub coord: Option<Coord>,
    pub main: MainBlock,
    pub wind: Option<WindBlock>,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MainBlock {
    pub temp: f64,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WindBlock {
    pub speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionBlock {
    pub main: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub city: CityBlock,
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CityBlock {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastItem {
    pub dt: i64,
    pub main: MainBlock,
    pub wind: Option<WindBlock>,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
}

/// Error body returned by the provider (`{"cod": "404", "message": "city not found"}`)
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

fn condition_of(weather: &[ConditionBlock]) -> (String, Option<String>) {
    weather.first().map_or_else(
        || ("Unknown".to_string(), None),
        |c| (c.main.clone(), c.description.clone()),
    )
}

impl CurrentResponse {
    pub(crate) fn into_current(self) -> Option<CurrentWeather> {
        let observed_at = DateTime::from_timestamp(self.dt, 0)?;
        let (condition, description) = condition_of(&self.weather);
        Some(CurrentWeather {
            location_name: self.name,
            latitude: self.coord.as_ref().map(|c| c.lat),
            longitude: self.coord.as_ref().map(|c| c.lon),
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            wind_speed: self.wind.and_then(|w| w.speed),
            condition,
            description,
            observed_at,
        })
    }
}

impl ForecastResponse {
    pub(crate) fn into_forecast(self) -> Option<Forecast> {
        let entries = self
            .list
            .into_iter()
            .map(|item| {
                let (condition, _) = condition_of(&item.weather);
                Some(ForecastEntry {
                    time: DateTime::from_timestamp(item.dt, 0)?,
                    temperature: item.main.temp,
                    humidity: item.main.humidity,
                    wind_speed: item.wind.and_then(|w| w.speed),
                    condition,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Forecast {
            city: self.city.name,
            entries,
        })
    }
}
