//! SQLite reading store using sqlx
//!
//! Readings are append-only. `seq` records insertion order and breaks ties
//! between readings sharing a timestamp.

use application::{error::ApplicationError, ports::ReadingStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Reading, ReadingId};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::error::{format_timestamp, map_sqlx_error, parse_timestamp};

const READING_COLUMNS: &str = "id, location, temperature, humidity, wind_speed, feels_like, \
                               condition, timestamp, breached_threshold";

/// Reading store backed by SQLite
#[derive(Debug, Clone)]
pub struct SqliteReadingStore {
    pool: SqlitePool,
}

impl SqliteReadingStore {
    /// Create a new reading store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of readings stored for a location
    pub async fn count(&self, location: &str) -> Result<i64, ApplicationError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM readings WHERE location = $1")
            .bind(location)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ReadingStore for SqliteReadingStore {
    #[instrument(skip(self, reading), fields(location = %reading.location, reading_id = %reading.id))]
    async fn save(&self, reading: &Reading) -> Result<(), ApplicationError> {
        sqlx::query(
            r"
            INSERT INTO readings (
                id, location, temperature, humidity, wind_speed, feels_like,
                condition, timestamp, breached_threshold
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(reading.id.to_string())
        .bind(&reading.location)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.wind_speed)
        .bind(reading.feels_like)
        .bind(&reading.condition)
        .bind(format_timestamp(reading.timestamp))
        .bind(reading.breached_threshold)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!("Reading saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest(&self, location: &str, limit: u32) -> Result<Vec<Reading>, ApplicationError> {
        let rows: Vec<ReadingRow> = sqlx::query_as(&format!(
            "SELECT {READING_COLUMNS} FROM readings WHERE location = $1 \
             ORDER BY timestamp DESC, seq DESC LIMIT $2"
        ))
        .bind(location)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(ReadingRow::into_entity).collect()
    }

    #[instrument(skip(self))]
    async fn in_range(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, ApplicationError> {
        let rows: Vec<ReadingRow> = sqlx::query_as(&format!(
            "SELECT {READING_COLUMNS} FROM readings \
             WHERE location = $1 AND timestamp >= $2 AND timestamp < $3 \
             ORDER BY timestamp ASC, seq ASC"
        ))
        .bind(location)
        .bind(format_timestamp(start))
        .bind(format_timestamp(end))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(ReadingRow::into_entity).collect()
    }

    #[instrument(skip(self), fields(reading_id = %id))]
    async fn mark_breached(&self, id: &ReadingId) -> Result<bool, ApplicationError> {
        let result = sqlx::query(
            "UPDATE readings SET breached_threshold = 1 WHERE id = $1 AND breached_threshold = 0",
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            debug!("Breach latch set");
            return Ok(true);
        }

        let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM readings WHERE id = $1")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        if exists {
            Ok(false)
        } else {
            Err(ApplicationError::NotFound(format!("Reading {id} not found")))
        }
    }
}

/// Row type for reading queries
#[derive(sqlx::FromRow)]
struct ReadingRow {
    id: String,
    location: String,
    temperature: f64,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    feels_like: Option<f64>,
    condition: String,
    timestamp: String,
    breached_threshold: bool,
}

impl ReadingRow {
    fn into_entity(self) -> Result<Reading, ApplicationError> {
        let id = ReadingId::parse(&self.id)
            .map_err(|e| ApplicationError::Persistence(format!("Invalid reading ID: {e}")))?;
        Ok(Reading {
            id,
            location: self.location,
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            feels_like: self.feels_like,
            condition: self.condition,
            timestamp: parse_timestamp(&self.timestamp)?,
            breached_threshold: self.breached_threshold,
        })
    }
}
