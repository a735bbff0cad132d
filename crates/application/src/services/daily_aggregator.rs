//! Daily aggregation service
//!
//! Recomputes the materialized daily summary of a location from the
//! readings stored for that UTC calendar day.

use std::{fmt, sync::Arc};

use chrono::{NaiveDate, Utc};
use domain::entities::{DailySummary, day_bounds};
use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::{ReadingStore, SummaryStore},
};

/// Service that turns a day of readings into a stored summary
#[derive(Clone)]
pub struct DailyAggregator {
    readings: Arc<dyn ReadingStore>,
    summaries: Arc<dyn SummaryStore>,
}

impl fmt::Debug for DailyAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DailyAggregator").finish_non_exhaustive()
    }
}

impl DailyAggregator {
    /// Create a new aggregator
    #[must_use]
    pub fn new(readings: Arc<dyn ReadingStore>, summaries: Arc<dyn SummaryStore>) -> Self {
        Self {
            readings,
            summaries,
        }
    }

    /// Aggregate a location's readings for `date` and persist the result
    ///
    /// Returns `Ok(None)` without touching the summary store when the day
    /// has no readings.
    #[instrument(skip(self))]
    pub async fn aggregate(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, ApplicationError> {
        let (start, end) = day_bounds(date);
        let readings = self.readings.in_range(location, start, end).await?;

        let Some(summary) = DailySummary::from_readings(location, date, &readings) else {
            debug!("No readings for day, skipping summary");
            return Ok(None);
        };

        self.summaries.upsert(&summary).await?;

        debug!(
            samples = summary.sample_count,
            avg_temp = summary.avg_temp,
            dominant = %summary.dominant_condition,
            "Daily summary updated"
        );
        Ok(Some(summary))
    }

    /// Aggregate the current UTC day
    pub async fn refresh_today(
        &self,
        location: &str,
    ) -> Result<Option<DailySummary>, ApplicationError> {
        self.aggregate(location, Utc::now().date_naive()).await
    }

    /// Look up a stored summary
    pub async fn get_summary(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, ApplicationError> {
        self.summaries.get(location, date).await
    }

    /// Most recent stored summaries for a location
    pub async fn recent_summaries(
        &self,
        location: &str,
        limit: u32,
    ) -> Result<Vec<DailySummary>, ApplicationError> {
        self.summaries.list_for_location(location, limit).await
    }
}
