//! Daily summary storage port

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::entities::DailySummary;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for daily summary persistence
///
/// One record per (location, date). Writing a summary for an existing key
/// replaces the stored record.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Insert or replace the summary for its (location, date)
    async fn upsert(&self, summary: &DailySummary) -> Result<(), ApplicationError>;

    /// Fetch the summary for a location and date
    async fn get(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, ApplicationError>;

    /// Most recent summaries for a location, newest date first
    async fn list_for_location(
        &self,
        location: &str,
        limit: u32,
    ) -> Result<Vec<DailySummary>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn SummaryStore) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SummaryStore>();
    }
}
