//! Alert sink that writes breach alerts to the log

use application::{error::ApplicationError, ports::AlertPort};
use async_trait::async_trait;
use domain::BreachAlert;
use tracing::warn;

/// Emits each breach alert as a WARN event
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertNotifier;

impl LogAlertNotifier {
    /// Create a new notifier
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertPort for LogAlertNotifier {
    async fn notify(&self, alert: &BreachAlert) -> Result<(), ApplicationError> {
        warn!(
            location = %alert.location,
            reading_id = %alert.reading_id,
            temperature = alert.temperature,
            previous_temperature = alert.previous_temperature,
            threshold = alert.threshold,
            "{}",
            alert.message()
        );
        Ok(())
    }
}
