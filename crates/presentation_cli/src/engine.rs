//! Local engine for offline commands
//!
//! Wires the SQLite stores, the daily aggregator and the breach detector
//! without the HTTP server or the provider, so stored data can be inspected
//! and the reference scenarios replayed from the command line.

use std::sync::Arc;

use application::{BreachDetector, BreachOutcome, DailyAggregator, ports::ReadingStore};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use domain::{DailySummary, Reading, Thresholds, day_bounds};
use infrastructure::{
    AsyncDatabase, AsyncDatabaseConfig, DatabaseConfig, LogAlertNotifier, SqliteReadingStore,
    SqliteSummaryStore,
};
use serde::Serialize;
use tracing::info;

/// Delhi sample day: (temperature, condition)
pub const SAMPLE_DAY: [(f64, &str); 4] = [
    (25.0, "Clear"),
    (28.0, "Clear"),
    (22.0, "Clouds"),
    (30.0, "Clear"),
];

/// Aggregator and detector over one database
pub struct LocalEngine {
    database: AsyncDatabase,
    readings: Arc<SqliteReadingStore>,
    aggregator: DailyAggregator,
    detector: BreachDetector,
}

impl std::fmt::Debug for LocalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEngine")
            .field("thresholds", self.detector.thresholds())
            .finish_non_exhaustive()
    }
}

/// One step of the breach replay
#[derive(Debug, Clone, Serialize)]
pub struct BreachStep {
    pub step: String,
    pub outcome: BreachOutcome,
}

impl LocalEngine {
    /// Open (and migrate) the configured database
    pub async fn open(config: &DatabaseConfig, thresholds: Thresholds) -> anyhow::Result<Self> {
        let database = AsyncDatabase::new(&AsyncDatabaseConfig::from(config)).await?;
        database.migrate().await?;

        let readings = Arc::new(SqliteReadingStore::new(database.pool().clone()));
        let summaries = Arc::new(SqliteSummaryStore::new(database.pool().clone()));
        let aggregator = DailyAggregator::new(readings.clone(), summaries);
        let detector = BreachDetector::new(
            readings.clone(),
            Arc::new(LogAlertNotifier::new()),
            thresholds,
        );

        Ok(Self {
            database,
            readings,
            aggregator,
            detector,
        })
    }

    /// Recompute and store the summary of `location` for `date`
    pub async fn summarize(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Option<DailySummary>> {
        Ok(self.aggregator.aggregate(location, date).await?)
    }

    /// Run breach detection on the latest readings of `location`
    pub async fn check(&self, location: &str) -> anyhow::Result<BreachOutcome> {
        Ok(self.detector.check(location).await?)
    }

    /// Most recent stored readings, newest first
    pub async fn readings(&self, location: &str, limit: u32) -> anyhow::Result<Vec<Reading>> {
        Ok(self.readings.latest(location, limit).await?)
    }

    /// Store the sample day for `location` on `date` and aggregate it
    pub async fn simulate_day(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Option<DailySummary>> {
        let (start, _) = day_bounds(date);
        for (i, (temperature, condition)) in SAMPLE_DAY.iter().enumerate() {
            let hours = 6 + 4 * i64::try_from(i)?;
            let at = start + Duration::hours(hours);
            let reading = Reading::observed_at(location, *temperature, *condition, at)?;
            self.readings.save(&reading).await?;
        }
        info!(location, %date, samples = SAMPLE_DAY.len(), "Sample day stored");
        self.summarize(location, date).await
    }

    /// Replay the consecutive breach scenario for `location`
    ///
    /// Stores 36 and 37 °C, checks twice (alert, then suppressed), stores
    /// 38 °C and checks again (new alert on the slid window).
    pub async fn simulate_breach(
        &self,
        location: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<BreachStep>> {
        let mut steps = Vec::with_capacity(3);

        self.store(location, 36.0, now - Duration::minutes(10)).await?;
        self.store(location, 37.0, now - Duration::minutes(5)).await?;
        steps.push(BreachStep {
            step: "two readings above threshold".to_string(),
            outcome: self.check(location).await?,
        });
        steps.push(BreachStep {
            step: "re-check same readings".to_string(),
            outcome: self.check(location).await?,
        });

        self.store(location, 38.0, now).await?;
        steps.push(BreachStep {
            step: "third reading above threshold".to_string(),
            outcome: self.check(location).await?,
        });

        Ok(steps)
    }

    async fn store(
        &self,
        location: &str,
        temperature: f64,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let reading = Reading::observed_at(location, temperature, "Clear", at)?;
        self.readings.save(&reading).await?;
        Ok(())
    }

    /// Close the database pool
    pub async fn close(self) {
        self.database.close().await;
    }
}
