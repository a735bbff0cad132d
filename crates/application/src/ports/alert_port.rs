//! Alert notification port

use async_trait::async_trait;
use domain::entities::BreachAlert;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Sink for temperature breach alerts
///
/// Implementations must not block for long; the breach detector holds the
/// per-location lock while notifying.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AlertPort: Send + Sync {
    /// Deliver an alert
    async fn notify(&self, alert: &BreachAlert) -> Result<(), ApplicationError>;
}
