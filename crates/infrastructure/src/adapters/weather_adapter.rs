//! Weather adapter - Implements WeatherPort using integration_weather

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{CurrentWeather, Forecast, ForecastEntry, WeatherPort};
use async_trait::async_trait;
use domain::value_objects::GeoLocation;
use integration_weather::{
    CurrentWeather as IntegrationCurrent, Forecast as IntegrationForecast, OpenWeatherMapClient,
    WeatherClient, WeatherConfig, WeatherError,
};
use tracing::{debug, instrument, warn};

/// Adapter for the OpenWeatherMap provider
pub struct WeatherAdapter {
    client: Arc<dyn WeatherClient>,
}

impl std::fmt::Debug for WeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAdapter")
            .field("client", &"dyn WeatherClient")
            .finish()
    }
}

impl WeatherAdapter {
    /// Create an adapter backed by an OpenWeatherMap client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn with_config(config: WeatherConfig) -> Result<Self, ApplicationError> {
        let client = OpenWeatherMapClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Create an adapter around any weather client
    #[must_use]
    pub fn with_client(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }

    /// Map integration weather error to application error
    fn map_error(err: WeatherError) -> ApplicationError {
        match err {
            WeatherError::ConnectionFailed(e)
            | WeatherError::RequestFailed(e)
            | WeatherError::ParseError(e)
            | WeatherError::ServiceUnavailable(e) => ApplicationError::ExternalService(e),
            WeatherError::Unauthorized => {
                ApplicationError::ExternalService("Weather API key rejected".into())
            },
            WeatherError::LocationNotFound(e) => ApplicationError::NotFound(e),
            WeatherError::InvalidCoordinates => {
                ApplicationError::InvalidInput("Invalid coordinates".into())
            },
            WeatherError::RateLimitExceeded => ApplicationError::RateLimited,
        }
    }

    fn map_current(current: IntegrationCurrent) -> CurrentWeather {
        CurrentWeather {
            location_name: current.location_name,
            temperature: current.temperature,
            feels_like: current.feels_like,
            humidity: current.humidity,
            wind_speed: current.wind_speed,
            condition: current.condition,
            description: current.description,
            observed_at: current.observed_at,
        }
    }

    fn map_forecast(forecast: IntegrationForecast) -> Forecast {
        Forecast {
            location_name: forecast.city,
            entries: forecast
                .entries
                .into_iter()
                .map(|e| ForecastEntry {
                    time: e.time,
                    temperature: e.temperature,
                    humidity: e.humidity,
                    wind_speed: e.wind_speed,
                    condition: e.condition,
                })
                .collect(),
        }
    }

    fn log_result<T>(result: &Result<T, ApplicationError>, what: &str) {
        match result {
            Ok(_) => debug!(what, "Weather request succeeded"),
            Err(e) => warn!(what, error = %e, "Weather request failed"),
        }
    }
}

#[async_trait]
impl WeatherPort for WeatherAdapter {
    #[instrument(skip(self))]
    async fn current_by_city(&self, city: &str) -> Result<CurrentWeather, ApplicationError> {
        if city.trim().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "City name must not be empty".into(),
            ));
        }

        let result = self
            .client
            .current_by_city(city)
            .await
            .map(Self::map_current)
            .map_err(Self::map_error);
        Self::log_result(&result, "current_by_city");
        result
    }

    #[instrument(skip(self), fields(lat = location.latitude(), lon = location.longitude()))]
    async fn current_by_coordinates(
        &self,
        location: &GeoLocation,
    ) -> Result<CurrentWeather, ApplicationError> {
        let result = self
            .client
            .current_by_coordinates(location.latitude(), location.longitude())
            .await
            .map(Self::map_current)
            .map_err(Self::map_error);
        Self::log_result(&result, "current_by_coordinates");
        result
    }

    #[instrument(skip(self))]
    async fn forecast_by_city(&self, city: &str) -> Result<Forecast, ApplicationError> {
        if city.trim().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "City name must not be empty".into(),
            ));
        }

        let result = self
            .client
            .forecast_by_city(city)
            .await
            .map(Self::map_forecast)
            .map_err(Self::map_error);
        Self::log_result(&result, "forecast_by_city");
        result
    }

    #[instrument(skip(self))]
    async fn is_available(&self) -> bool {
        self.client.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_config_creates_adapter() {
        let adapter = WeatherAdapter::with_config(WeatherConfig::new("key"));
        assert!(adapter.is_ok());
    }

    #[test]
    fn debug_impl_hides_client() {
        let adapter = WeatherAdapter::with_config(WeatherConfig::new("secret-key")).unwrap();
        let debug_str = format!("{adapter:?}");
        assert!(debug_str.contains("WeatherAdapter"));
        assert!(!debug_str.contains("secret-key"));
    }

    #[test]
    fn map_error_transport_is_external() {
        for err in [
            WeatherError::ConnectionFailed("timeout".into()),
            WeatherError::ParseError("bad json".into()),
            WeatherError::ServiceUnavailable("503".into()),
            WeatherError::Unauthorized,
        ] {
            assert!(matches!(
                WeatherAdapter::map_error(err),
                ApplicationError::ExternalService(_)
            ));
        }
    }

    #[test]
    fn map_error_rate_limited() {
        let app_err = WeatherAdapter::map_error(WeatherError::RateLimitExceeded);
        assert!(matches!(app_err, ApplicationError::RateLimited));
    }

    #[test]
    fn map_error_invalid_coords() {
        let app_err = WeatherAdapter::map_error(WeatherError::InvalidCoordinates);
        assert!(matches!(app_err, ApplicationError::InvalidInput(_)));
    }

    #[test]
    fn map_error_unknown_city() {
        let app_err = WeatherAdapter::map_error(WeatherError::LocationNotFound("city".into()));
        assert!(matches!(app_err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_city_is_rejected_before_request() {
        let adapter = WeatherAdapter::with_config(WeatherConfig::new("key")).unwrap();
        let err = adapter.current_by_city("  ").await.unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidInput(_)));
        let err = adapter.forecast_by_city("").await.unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidInput(_)));
    }

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WeatherAdapter>();
    }
}
