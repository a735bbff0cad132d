//! Integration tests for the OpenWeatherMap client using wiremock
//!
//! These tests verify the client's behavior against a mock HTTP server,
//! ensuring proper handling of various response scenarios.

use integration_weather::{OpenWeatherMapClient, WeatherClient, WeatherConfig, WeatherError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

/// Sample `/weather` response for Delhi
fn sample_current_response() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": 77.2167, "lat": 28.6667},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "base": "stations",
        "main": {
            "temp": 36.4,
            "feels_like": 38.9,
            "temp_min": 36.4,
            "temp_max": 36.4,
            "pressure": 1004,
            "humidity": 32
        },
        "visibility": 4000,
        "wind": {"speed": 4.12, "deg": 300},
        "clouds": {"all": 0},
        "dt": 1_760_860_800,
        "sys": {"country": "IN", "sunrise": 1_760_835_000, "sunset": 1_760_877_000},
        "timezone": 19800,
        "id": 1_273_294,
        "name": "Delhi",
        "cod": 200
    })
}

/// Sample `/forecast` response with three slots
fn sample_forecast_response() -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": 3,
        "list": [
            {
                "dt": 1_760_864_400,
                "main": {"temp": 33.1, "feels_like": 34.0, "humidity": 35},
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
                "wind": {"speed": 3.4, "deg": 290},
                "dt_txt": "2025-10-19 09:00:00"
            },
            {
                "dt": 1_760_875_200,
                "main": {"temp": 30.2, "feels_like": 31.0, "humidity": 41},
                "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds"}],
                "wind": {"speed": 2.9, "deg": 280},
                "dt_txt": "2025-10-19 12:00:00"
            },
            {
                "dt": 1_760_886_000,
                "main": {"temp": 27.5, "feels_like": 28.0, "humidity": 55},
                "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
                "wind": {"speed": 1.8, "deg": 270},
                "dt_txt": "2025-10-19 15:00:00"
            }
        ],
        "city": {"id": 1_273_294, "name": "Delhi", "country": "IN", "timezone": 19800}
    })
}

/// Create a test client configured to use the mock server
fn create_test_client(mock_server: &MockServer) -> OpenWeatherMapClient {
    let config = WeatherConfig {
        base_url: mock_server.uri(),
        timeout_secs: 5,
        ..WeatherConfig::new("test-key")
    };
    #[allow(clippy::expect_used)]
    OpenWeatherMapClient::new(config).expect("Failed to create client")
}

async fn setup_mock(mock_server: &MockServer, resource: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(resource))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn test_current_by_city_success() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/weather",
        ResponseTemplate::new(200).set_body_json(sample_current_response()),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.current_by_city("Delhi").await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");

    let weather = result.unwrap();
    assert_eq!(weather.location_name, "Delhi");
    assert!((weather.temperature - 36.4).abs() < 1e-9);
    assert_eq!(weather.humidity, Some(32.0));
    assert_eq!(weather.wind_speed, Some(4.12));
    assert_eq!(weather.condition, "Clear");
}

#[tokio::test]
async fn test_current_by_coordinates_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "28.6667"))
        .and(query_param("lon", "77.2167"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let weather = client.current_by_coordinates(28.6667, 77.2167).await.unwrap();
    assert_eq!(weather.latitude, Some(28.6667));
}

#[tokio::test]
async fn test_forecast_by_city_success() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/forecast",
        ResponseTemplate::new(200).set_body_json(sample_forecast_response()),
    )
    .await;

    let client = create_test_client(&mock_server);
    let forecast = client.forecast_by_city("Delhi").await.unwrap();

    assert_eq!(forecast.city, "Delhi");
    assert_eq!(forecast.entries.len(), 3);
    assert_eq!(forecast.entries[2].condition, "Rain");
    assert_eq!(forecast.entries[1].humidity, Some(41.0));
}

#[tokio::test]
async fn test_health_check_success() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/weather",
        ResponseTemplate::new(200).set_body_json(sample_current_response()),
    )
    .await;

    let client = create_test_client(&mock_server);
    assert!(client.is_healthy().await, "Expected health check to succeed");
}

// ============================================================================
// Error handling scenarios
// ============================================================================

#[tokio::test]
async fn test_unauthorized() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/weather",
        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.current_by_city("Delhi").await;
    assert!(
        matches!(result, Err(WeatherError::Unauthorized)),
        "Expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unknown_city() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/forecast",
        ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.forecast_by_city("Atlantis").await;
    match result {
        Err(WeatherError::LocationNotFound(message)) => assert_eq!(message, "city not found"),
        other => panic!("Expected LocationNotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_returns_service_unavailable() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/weather",
        ResponseTemplate::new(503).set_body_string("Service Unavailable"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.current_by_city("Delhi").await;
    assert!(
        matches!(result, Err(WeatherError::ServiceUnavailable(_))),
        "Expected ServiceUnavailable, got: {result:?}"
    );
}

#[tokio::test]
async fn test_rate_limit_error() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/weather",
        ResponseTemplate::new(429).set_body_string("Rate limit exceeded"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.current_by_city("Delhi").await;
    assert!(
        matches!(result, Err(WeatherError::RateLimitExceeded)),
        "Expected RateLimitExceeded, got: {result:?}"
    );
}

#[tokio::test]
async fn test_invalid_json_response() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/weather",
        ResponseTemplate::new(200).set_body_string("not valid json"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.current_by_city("Delhi").await;
    assert!(
        matches!(result, Err(WeatherError::ParseError(_))),
        "Expected ParseError, got: {result:?}"
    );
}

#[tokio::test]
async fn test_health_check_fails_on_server_error() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/weather",
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;

    let client = create_test_client(&mock_server);
    assert!(!client.is_healthy().await, "Expected health check to fail");
}

// ============================================================================
// Input validation scenarios
// ============================================================================

#[tokio::test]
async fn test_invalid_coordinates() {
    let mock_server = MockServer::start().await;

    // Validation fails before any request is made
    let client = create_test_client(&mock_server);
    let result = client.current_by_coordinates(91.0, 13.405).await;
    assert!(
        matches!(result, Err(WeatherError::InvalidCoordinates)),
        "Expected InvalidCoordinates, got: {result:?}"
    );
}

// ============================================================================
// Query parameter verification
// ============================================================================

#[tokio::test]
async fn test_request_contains_credential_and_metric_units() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Mumbai"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.current_by_city("Mumbai").await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");
}
