//! SQLite daily summary store using sqlx

use application::{error::ApplicationError, ports::SummaryStore};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use domain::DailySummary;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::error::{format_timestamp, map_sqlx_error};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Summary store backed by SQLite, one row per (location, date)
#[derive(Debug, Clone)]
pub struct SqliteSummaryStore {
    pool: SqlitePool,
}

impl SqliteSummaryStore {
    /// Create a new summary store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryStore for SqliteSummaryStore {
    #[instrument(skip(self, summary), fields(location = %summary.location, date = %summary.date))]
    async fn upsert(&self, summary: &DailySummary) -> Result<(), ApplicationError> {
        sqlx::query(
            r"
            INSERT INTO daily_summaries (
                location, date, avg_temp, max_temp, min_temp, avg_humidity,
                avg_wind_speed, dominant_condition, sample_count, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT(location, date) DO UPDATE SET
                avg_temp = excluded.avg_temp,
                max_temp = excluded.max_temp,
                min_temp = excluded.min_temp,
                avg_humidity = excluded.avg_humidity,
                avg_wind_speed = excluded.avg_wind_speed,
                dominant_condition = excluded.dominant_condition,
                sample_count = excluded.sample_count,
                updated_at = excluded.updated_at
            ",
        )
        .bind(&summary.location)
        .bind(summary.date.format(DATE_FORMAT).to_string())
        .bind(summary.avg_temp)
        .bind(summary.max_temp)
        .bind(summary.min_temp)
        .bind(summary.avg_humidity)
        .bind(summary.avg_wind_speed)
        .bind(&summary.dominant_condition)
        .bind(i64::from(summary.sample_count))
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!("Daily summary upserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, ApplicationError> {
        let row: Option<SummaryRow> = sqlx::query_as(
            r"
            SELECT location, date, avg_temp, max_temp, min_temp, avg_humidity,
                   avg_wind_speed, dominant_condition, sample_count
            FROM daily_summaries WHERE location = $1 AND date = $2
            ",
        )
        .bind(location)
        .bind(date.format(DATE_FORMAT).to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(SummaryRow::into_entity).transpose()
    }

    #[instrument(skip(self))]
    async fn list_for_location(
        &self,
        location: &str,
        limit: u32,
    ) -> Result<Vec<DailySummary>, ApplicationError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r"
            SELECT location, date, avg_temp, max_temp, min_temp, avg_humidity,
                   avg_wind_speed, dominant_condition, sample_count
            FROM daily_summaries WHERE location = $1
            ORDER BY date DESC LIMIT $2
            ",
        )
        .bind(location)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(SummaryRow::into_entity).collect()
    }
}

/// Row type for summary queries
#[derive(sqlx::FromRow)]
struct SummaryRow {
    location: String,
    date: String,
    avg_temp: f64,
    max_temp: f64,
    min_temp: f64,
    avg_humidity: f64,
    avg_wind_speed: f64,
    dominant_condition: String,
    sample_count: i64,
}

impl SummaryRow {
    fn into_entity(self) -> Result<DailySummary, ApplicationError> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| ApplicationError::Persistence(format!("Invalid stored date: {e}")))?;
        let sample_count = u32::try_from(self.sample_count)
            .map_err(|e| ApplicationError::Persistence(format!("Invalid sample count: {e}")))?;
        Ok(DailySummary {
            location: self.location,
            date,
            avg_temp: self.avg_temp,
            max_temp: self.max_temp,
            min_temp: self.min_temp,
            avg_humidity: self.avg_humidity,
            avg_wind_speed: self.avg_wind_speed,
            dominant_condition: self.dominant_condition,
            sample_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::AsyncDatabase;

    async fn store() -> SqliteSummaryStore {
        let db = AsyncDatabase::in_memory().await.unwrap();
        SqliteSummaryStore::new(db.pool().clone())
    }

    fn summary(location: &str, day: u32, avg: f64) -> DailySummary {
        DailySummary {
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            avg_temp: avg,
            max_temp: avg + 4.0,
            min_temp: avg - 4.0,
            avg_humidity: 0.0,
            avg_wind_speed: 10.8,
            dominant_condition: "Clear".to_string(),
            sample_count: 4,
        }
    }

    #[tokio::test]
    async fn upsert_and_get() {
        let store = store().await;
        let s = summary("Delhi", 19, 26.25);
        store.upsert(&s).await.unwrap();

        let fetched = store.get("Delhi", s.date).await.unwrap().unwrap();
        assert_eq!(fetched, s);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_key() {
        let store = store().await;
        store.upsert(&summary("Delhi", 19, 20.0)).await.unwrap();
        let replacement = DailySummary {
            dominant_condition: "Rain".to_string(),
            sample_count: 9,
            ..summary("Delhi", 19, 22.0)
        };
        store.upsert(&replacement).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_summaries")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let fetched = store.get("Delhi", replacement.date).await.unwrap().unwrap();
        assert_eq!(fetched, replacement);
    }

    #[tokio::test]
    async fn missing_summary_is_none() {
        let store = store().await;
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(store.get("Delhi", date).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_newest_first() {
        let store = store().await;
        for day in [17, 19, 18] {
            store.upsert(&summary("Chennai", day, 30.0)).await.unwrap();
        }
        store.upsert(&summary("Delhi", 20, 30.0)).await.unwrap();

        let list = store.list_for_location("Chennai", 2).await.unwrap();
        let days: Vec<String> = list.iter().map(|s| s.date.to_string()).collect();
        assert_eq!(days, vec!["2026-10-19", "2026-10-18"]);
    }
}
