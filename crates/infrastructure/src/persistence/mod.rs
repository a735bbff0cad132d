//! Persistence module
//!
//! SQLite storage for readings and daily summaries through a shared sqlx pool.

pub mod async_connection;
pub mod database_health;
pub mod error;
pub mod reading_store;
pub mod summary_store;

pub use async_connection::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError};
pub use database_health::SqliteDatabaseHealth;
pub use reading_store::SqliteReadingStore;
pub use summary_store::SqliteSummaryStore;
