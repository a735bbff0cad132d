//! Reading storage port
//!
//! Append-only persistence of weather readings. Adapters in the
//! infrastructure layer implement this port using SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::Reading;
use domain::value_objects::ReadingId;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for reading persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Append a reading
    async fn save(&self, reading: &Reading) -> Result<(), ApplicationError>;

    /// Last `limit` readings for a location, newest first
    ///
    /// Readings with equal timestamps are ordered by insertion, later first.
    async fn latest(&self, location: &str, limit: u32) -> Result<Vec<Reading>, ApplicationError>;

    /// All readings for a location with `start <= timestamp < end`, oldest first
    async fn in_range(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, ApplicationError>;

    /// Set the breach latch on a reading
    ///
    /// Returns `true` if the latch flipped, `false` if it was already set.
    /// The latch is never cleared.
    async fn mark_breached(&self, id: &ReadingId) -> Result<bool, ApplicationError>;
}
