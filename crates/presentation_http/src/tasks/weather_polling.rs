//! Weather polling background task
//!
//! Runs a monitoring cycle on a fixed interval until cancelled.

use std::sync::Arc;
use std::time::Duration;

use application::WeatherMonitor;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Spawn a background task that runs `monitor.run_cycle()` every `poll_interval`.
///
/// The first cycle runs immediately. Ticks missed while a cycle overran are
/// skipped rather than bunched up. Cancelling `shutdown` stops scheduling new
/// cycles; a cycle already in flight is allowed to finish.
///
/// Returns a `JoinHandle` to await on shutdown.
pub fn spawn_weather_polling_task(
    monitor: Arc<WeatherMonitor>,
    poll_interval: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    info!(
        interval_ms = u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX),
        locations = monitor.locations().len(),
        "Starting weather polling background task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    info!("Weather polling task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let report = monitor.run_cycle().await;
                    debug!(
                        succeeded = report.succeeded(),
                        failed = report.failed(),
                        "Polling cycle complete"
                    );
                }
            }
        }
    })
}
