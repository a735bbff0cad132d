//! OpenWeatherMap integration
//!
//! Client for the OpenWeatherMap 2.5 API (<https://openweathermap.org/api>).
//! Provides current conditions by city or coordinates and the 5-day / 3-hour
//! forecast. Requires an API key.

pub mod client;
mod models;

pub use client::{
    OpenWeatherMapClient, WeatherClient, WeatherConfig, WeatherError, default_base_url,
};
pub use models::{CurrentWeather, Forecast, ForecastEntry};
