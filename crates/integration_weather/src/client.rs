//! OpenWeatherMap client
//!
//! HTTP client for the OpenWeatherMap 2.5 API (current weather and the
//! 5-day / 3-hour forecast), always queried with `units=metric`.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::{CurrentResponse, CurrentWeather, ErrorBody, Forecast, ForecastResponse};

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Connection to the weather service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the weather service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// API key missing or rejected
    #[error("Unauthorized: API key rejected")]
    Unauthorized,

    /// Provider does not know the requested location
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Invalid coordinates provided
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Weather service configuration
#[derive(Clone, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key (`appid`)
    pub api_key: SecretString,

    /// API base URL (default: <https://api.openweathermap.org/data/2.5>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Default API base URL
pub fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl WeatherConfig {
    /// Configuration with default endpoint and timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Weather client trait for fetching weather data
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Current weather by city name
    async fn current_by_city(&self, city: &str) -> Result<CurrentWeather, WeatherError>;

    /// Current weather by coordinates
    async fn current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentWeather, WeatherError>;

    /// 5-day / 3-hour forecast by city name
    async fn forecast_by_city(&self, city: &str) -> Result<Forecast, WeatherError>;

    /// Check if the weather service is healthy
    async fn is_healthy(&self) -> bool;
}

/// OpenWeatherMap HTTP client implementation
#[derive(Debug)]
pub struct OpenWeatherMapClient {
    client: Client,
    config: WeatherConfig,
}

impl OpenWeatherMapClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates);
        }
        Ok(())
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{resource}", self.config.base_url.trim_end_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = self.endpoint(resource);
        debug!(url = %url, "Calling OpenWeatherMap");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[
                ("appid", self.config.api_key.expose_secret()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    WeatherError::ConnectionFailed(e.to_string())
                } else if e.is_timeout() {
                    WeatherError::RequestFailed("request timed out".to_string())
                } else {
                    WeatherError::RequestFailed(e.to_string())
                }
            })?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| WeatherError::ParseError(e.to_string()))
    }

    async fn check_status(response: Response) -> Result<Response, WeatherError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(WeatherError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => Err(WeatherError::RateLimitExceeded),
            StatusCode::NOT_FOUND => {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| "not found".to_string());
                Err(WeatherError::LocationNotFound(message))
            },
            s if s.is_server_error() => Err(WeatherError::ServiceUnavailable(format!("HTTP {s}"))),
            s => Err(WeatherError::RequestFailed(format!("HTTP {s}"))),
        }
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherMapClient {
    #[instrument(skip(self))]
    async fn current_by_city(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let response: CurrentResponse = self.get_json("weather", &[("q", city.to_string())]).await?;
        response
            .into_current()
            .ok_or_else(|| WeatherError::ParseError("invalid observation timestamp".to_string()))
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentWeather, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let response: CurrentResponse = self
            .get_json(
                "weather",
                &[("lat", latitude.to_string()), ("lon", longitude.to_string())],
            )
            .await?;
        response
            .into_current()
            .ok_or_else(|| WeatherError::ParseError("invalid observation timestamp".to_string()))
    }

    #[instrument(skip(self))]
    async fn forecast_by_city(&self, city: &str) -> Result<Forecast, WeatherError> {
        let response: ForecastResponse =
            self.get_json("forecast", &[("q", city.to_string())]).await?;
        response
            .into_forecast()
            .ok_or_else(|| WeatherError::ParseError("invalid forecast timestamp".to_string()))
    }

    async fn is_healthy(&self) -> bool {
        // New Delhi
        self.current_by_coordinates(28.6139, 77.209).await.is_ok()
    }
}
