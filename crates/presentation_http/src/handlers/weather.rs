//! Weather lookup, stored readings and daily summary handlers

use application::ports::{CurrentWeather, Forecast};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{NaiveDate, Utc};
use domain::{DailySummary, GeoLocation, Reading};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

/// Default number of readings returned
pub const DEFAULT_READINGS_LIMIT: u32 = 20;

/// Upper bound on readings returned per request
pub const MAX_READINGS_LIMIT: u32 = 500;

const WEATHER_FAILURE: &str = "Failed to fetch weather data";
const FORECAST_FAILURE: &str = "Failed to fetch forecast data";

/// `?location=` query
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

/// `?lat=&lon=` query, parsed by hand so malformed numbers get a JSON 400
#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// `?location=&limit=` query
#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    pub location: Option<String>,
    pub limit: Option<String>,
}

/// `?location=&date=` query
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub location: Option<String>,
    pub date: Option<String>,
}

/// Stored readings for one location
#[derive(Debug, Serialize)]
pub struct ReadingsResponse {
    pub location: String,
    pub count: usize,
    pub readings: Vec<Reading>,
}

/// Stored summaries for one location, newest date first
#[derive(Debug, Serialize)]
pub struct SummariesResponse {
    pub location: String,
    pub count: usize,
    pub summaries: Vec<DailySummary>,
}

fn require_location(location: Option<String>) -> Result<String, ApiError> {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Location is required".to_string()))
}

fn parse_coordinates(query: &CoordinatesQuery) -> Result<GeoLocation, ApiError> {
    let (Some(lat), Some(lon)) = (query.lat.as_deref(), query.lon.as_deref()) else {
        return Err(ApiError::BadRequest(
            "Latitude and longitude are required".to_string(),
        ));
    };

    let parse = |value: &str, name: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| ApiError::BadRequest(format!("Invalid {name}: {value}")))
    };
    let latitude = parse(lat, "latitude")?;
    let longitude = parse(lon, "longitude")?;

    GeoLocation::new(latitude, longitude).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn parse_limit(limit: Option<&str>) -> Result<u32, ApiError> {
    match limit {
        None => Ok(DEFAULT_READINGS_LIMIT),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(ApiError::BadRequest(format!(
                "Invalid limit: {raw}. Use 1 to {MAX_READINGS_LIMIT}"
            ))),
            Ok(n) => Ok(n.min(MAX_READINGS_LIMIT)),
        },
    }
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate, ApiError> {
    date.map_or_else(
        || Ok(Utc::now().date_naive()),
        |raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ApiError::BadRequest(format!("Invalid date: {raw}. Use YYYY-MM-DD"))
            })
        },
    )
}

/// Current weather by city name
#[instrument(skip(state))]
pub async fn current_by_city(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<CurrentWeather>, ApiError> {
    let location = require_location(query.location)?;
    let weather = state
        .weather
        .current_by_city(&location)
        .await
        .map_err(|e| ApiError::from_provider(e, WEATHER_FAILURE))?;
    Ok(Json(weather))
}

/// Current weather by coordinates
#[instrument(skip(state))]
pub async fn current_by_coordinates(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<CurrentWeather>, ApiError> {
    let location = parse_coordinates(&query)?;
    let weather = state
        .weather
        .current_by_coordinates(&location)
        .await
        .map_err(|e| ApiError::from_provider(e, WEATHER_FAILURE))?;
    Ok(Json(weather))
}

/// 5-day / 3-hour forecast by city name
#[instrument(skip(state))]
pub async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Forecast>, ApiError> {
    let location = require_location(query.location)?;
    let forecast = state
        .weather
        .forecast_by_city(&location)
        .await
        .map_err(|e| ApiError::from_provider(e, FORECAST_FAILURE))?;
    Ok(Json(forecast))
}

/// Stored readings, newest first
#[instrument(skip(state))]
pub async fn readings(
    State(state): State<AppState>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Json<ReadingsResponse>, ApiError> {
    let location = require_location(query.location)?;
    let limit = parse_limit(query.limit.as_deref())?;
    let readings = state.readings.latest(&location, limit).await?;
    Ok(Json(ReadingsResponse {
        location,
        count: readings.len(),
        readings,
    }))
}

/// Stored daily summary for a location and UTC date
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let location = require_location(query.location)?;
    let date = parse_date(query.date.as_deref())?;
    state
        .aggregator
        .get_summary(&location, date)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No summary for {location} on {date}")))
}

/// Recent daily summaries for a location (`?location=&limit=`)
#[instrument(skip(state))]
pub async fn summaries(
    State(state): State<AppState>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Json<SummariesResponse>, ApiError> {
    let location = require_location(query.location)?;
    let limit = parse_limit(query.limit.as_deref())?;
    let summaries = state.aggregator.recent_summaries(&location, limit).await?;
    Ok(Json(SummariesResponse {
        location,
        count: summaries.len(),
        summaries,
    }))
}
