//! Database health check port

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Port for database connectivity checks
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DatabaseHealthPort: Send + Sync {
    /// Check if the database is available and responding
    ///
    /// Performs a lightweight query (e.g., `SELECT 1`) to verify connectivity.
    async fn is_available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_reports_availability() {
        let mut mock = MockDatabaseHealthPort::new();
        mock.expect_is_available().returning(|| true);
        assert!(mock.is_available().await);
    }
}
