//! Polling-cycle orchestration
//!
//! One cycle fans out over the configured locations. Each location runs
//! fetch, store, aggregate and detect as an independent future; a failure
//! stops only that location's pipeline and is recorded in the report.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{Instrument, error, info, info_span, warn};

use crate::{
    error::ApplicationError,
    ports::{ReadingStore, WeatherPort},
    services::{BreachDetector, DailyAggregator},
};

/// Default upper bound on one provider fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the weather monitor
#[derive(Debug, Clone)]
pub struct WeatherMonitorConfig {
    /// Locations polled every cycle
    pub locations: Vec<String>,
    /// Upper bound on one provider fetch
    pub fetch_timeout: Duration,
}

impl Default for WeatherMonitorConfig {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Step of the per-location pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
    Fetch,
    Store,
    Aggregate,
    Detect,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Store => "store",
            Self::Aggregate => "aggregate",
            Self::Detect => "detect",
        };
        f.write_str(name)
    }
}

/// Result of one location within a cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationOutcome {
    Processed {
        temperature: f64,
        alert_raised: bool,
        condition_breach: bool,
    },
    Failed {
        stage: CycleStage,
        error: String,
    },
}

impl LocationOutcome {
    fn failed(stage: CycleStage, error: &ApplicationError) -> Self {
        Self::Failed {
            stage,
            error: error.to_string(),
        }
    }

    /// Whether the location completed every stage
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }
}

/// Per-location outcomes of one cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Outcomes in configured location order
    pub outcomes: Vec<(String, LocationOutcome)>,
}

impl CycleReport {
    /// Number of locations processed successfully
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }

    /// Number of locations that failed at some stage
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Number of temperature alerts raised in this cycle
    #[must_use]
    pub fn alerts_raised(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    LocationOutcome::Processed {
                        alert_raised: true,
                        ..
                    }
                )
            })
            .count()
    }

    /// Outcome for a location, if it was part of the cycle
    #[must_use]
    pub fn outcome_for(&self, location: &str) -> Option<&LocationOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == location)
            .map(|(_, o)| o)
    }
}

/// Running counters across cycles
#[derive(Debug, Default)]
pub struct MonitorStats {
    cycles: AtomicU64,
    locations_succeeded: AtomicU64,
    locations_failed: AtomicU64,
    alerts_raised: AtomicU64,
    last_cycle_at: RwLock<Option<DateTime<Utc>>>,
    last_cycle_duration_ms: AtomicU64,
    last_error: RwLock<Option<String>>,
}

/// Serializable view of [`MonitorStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorStatsSnapshot {
    pub cycles: u64,
    pub locations_succeeded: u64,
    pub locations_failed: u64,
    pub alerts_raised: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_cycle_duration_ms: u64,
    pub last_error: Option<String>,
}

impl MonitorStats {
    fn record(&self, report: &CycleReport) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.locations_succeeded
            .fetch_add(report.succeeded() as u64, Ordering::Relaxed);
        self.locations_failed
            .fetch_add(report.failed() as u64, Ordering::Relaxed);
        self.alerts_raised
            .fetch_add(report.alerts_raised() as u64, Ordering::Relaxed);

        let duration = (report.finished_at - report.started_at)
            .num_milliseconds()
            .max(0);
        self.last_cycle_duration_ms
            .store(duration.unsigned_abs(), Ordering::Relaxed);
        *self.last_cycle_at.write() = Some(report.finished_at);

        let last_failure = report.outcomes.iter().rev().find_map(|(name, o)| match o {
            LocationOutcome::Failed { stage, error } => Some(format!("{name} ({stage}): {error}")),
            LocationOutcome::Processed { .. } => None,
        });
        if let Some(message) = last_failure {
            *self.last_error.write() = Some(message);
        }
    }

    /// Take a consistent-enough copy of the counters
    #[must_use]
    pub fn snapshot(&self) -> MonitorStatsSnapshot {
        MonitorStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            locations_succeeded: self.locations_succeeded.load(Ordering::Relaxed),
            locations_failed: self.locations_failed.load(Ordering::Relaxed),
            alerts_raised: self.alerts_raised.load(Ordering::Relaxed),
            last_cycle_at: *self.last_cycle_at.read(),
            last_cycle_duration_ms: self.last_cycle_duration_ms.load(Ordering::Relaxed),
            last_error: self.last_error.read().clone(),
        }
    }
}

/// Drives the fetch, store, aggregate and detect pipeline for every location
pub struct WeatherMonitor {
    weather: Arc<dyn WeatherPort>,
    readings: Arc<dyn ReadingStore>,
    aggregator: DailyAggregator,
    detector: Arc<BreachDetector>,
    config: WeatherMonitorConfig,
    stats: MonitorStats,
}

impl fmt::Debug for WeatherMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherMonitor")
            .field("locations", &self.config.locations)
            .field("fetch_timeout", &self.config.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl WeatherMonitor {
    /// Create a new monitor
    #[must_use]
    pub fn new(
        weather: Arc<dyn WeatherPort>,
        readings: Arc<dyn ReadingStore>,
        aggregator: DailyAggregator,
        detector: Arc<BreachDetector>,
        config: WeatherMonitorConfig,
    ) -> Self {
        Self {
            weather,
            readings,
            aggregator,
            detector,
            config,
            stats: MonitorStats::default(),
        }
    }

    /// Locations polled every cycle
    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.config.locations
    }

    /// Running counters
    #[must_use]
    pub const fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Run one polling cycle over every configured location
    ///
    /// Never fails: per-location errors are logged and reported in the
    /// returned [`CycleReport`].
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        info!(locations = self.config.locations.len(), "Starting weather cycle");

        let futures = self.config.locations.iter().map(|location| {
            let span = info_span!("location", location = %location);
            async move {
                let outcome = self.process_location(location).await;
                (location.clone(), outcome)
            }
            .instrument(span)
        });
        let outcomes = join_all(futures).await;

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        self.stats.record(&report);

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            alerts = report.alerts_raised(),
            "Weather cycle finished"
        );
        report
    }

    /// Run the pipeline for a single location
    pub async fn process_location(&self, location: &str) -> LocationOutcome {
        let weather = match tokio::time::timeout(
            self.config.fetch_timeout,
            self.weather.current_by_city(location),
        )
        .await
        {
            Ok(Ok(weather)) => weather,
            Ok(Err(e)) => return Self::fail(CycleStage::Fetch, &e),
            Err(_) => {
                let e = ApplicationError::ExternalService(format!(
                    "fetch timed out after {}ms",
                    self.config.fetch_timeout.as_millis()
                ));
                return Self::fail(CycleStage::Fetch, &e);
            },
        };

        let reading = match weather.to_reading(location) {
            Ok(reading) => reading,
            Err(e) => return Self::fail(CycleStage::Fetch, &ApplicationError::from(e)),
        };
        if let Err(e) = self.readings.save(&reading).await {
            return Self::fail(CycleStage::Store, &e);
        }

        // A provider timestamp from before midnight still belongs to its own day
        let today = Utc::now().date_naive();
        let reading_day = reading.timestamp.date_naive();
        let days = if reading_day == today {
            vec![today]
        } else {
            vec![reading_day, today]
        };
        for day in days {
            if let Err(e) = self.aggregator.aggregate(location, day).await {
                return Self::fail(CycleStage::Aggregate, &e);
            }
        }

        match self.detector.check(location).await {
            Ok(outcome) => LocationOutcome::Processed {
                temperature: reading.temperature,
                alert_raised: outcome.alert_raised(),
                condition_breach: outcome.condition_breach,
            },
            Err(e) => Self::fail(CycleStage::Detect, &e),
        }
    }

    fn fail(stage: CycleStage, error: &ApplicationError) -> LocationOutcome {
        if matches!(error, ApplicationError::RateLimited) {
            warn!(%stage, "Provider rate limit hit, skipping location this cycle");
        } else {
            error!(%stage, error = %error, "Location processing failed");
        }
        LocationOutcome::failed(stage, error)
    }
}

#[cfg(test)]
mod tests {
    use domain::entities::Reading;
    use domain::value_objects::Thresholds;

    use super::*;
    use crate::ports::{
        CurrentWeather, MockAlertPort, MockReadingStore, MockSummaryStore, MockWeatherPort,
    };

    fn weather(temp: f64) -> CurrentWeather {
        CurrentWeather {
            location_name: "Provider Name".to_string(),
            temperature: temp,
            feels_like: None,
            humidity: Some(50.0),
            wind_speed: Some(3.0),
            condition: "Clear".to_string(),
            description: None,
            observed_at: Utc::now(),
        }
    }

    fn config(locations: &[&str]) -> WeatherMonitorConfig {
        WeatherMonitorConfig {
            locations: locations.iter().map(ToString::to_string).collect(),
            fetch_timeout: Duration::from_millis(200),
        }
    }

    fn monitor(
        weather: MockWeatherPort,
        readings: MockReadingStore,
        summaries: MockSummaryStore,
        alerts: MockAlertPort,
        locations: &[&str],
    ) -> WeatherMonitor {
        let readings: Arc<dyn ReadingStore> = Arc::new(readings);
        let aggregator = DailyAggregator::new(Arc::clone(&readings), Arc::new(summaries));
        let detector = Arc::new(BreachDetector::new(
            Arc::clone(&readings),
            Arc::new(alerts),
            Thresholds::default(),
        ));
        WeatherMonitor::new(
            Arc::new(weather),
            readings,
            aggregator,
            detector,
            config(locations),
        )
    }

    #[tokio::test]
    async fn failing_location_does_not_stop_others() {
        let mut weather_port = MockWeatherPort::new();
        weather_port
            .expect_current_by_city()
            .returning(|city| match city {
                "Mumbai" => Err(ApplicationError::ExternalService("502".into())),
                _ => Ok(weather(30.0)),
            });

        let mut readings = MockReadingStore::new();
        readings
            .expect_save()
            .withf(|r| r.location == "Delhi" || r.location == "Chennai")
            .times(2)
            .returning(|_| Ok(()));
        readings.expect_in_range().returning(|location, _, _| {
            Ok(vec![Reading::new(location, 30.0, "Clear").unwrap()])
        });
        readings.expect_latest().returning(|_, _| Ok(Vec::new()));

        let mut summaries = MockSummaryStore::new();
        summaries.expect_upsert().times(2).returning(|_| Ok(()));

        let monitor = monitor(
            weather_port,
            readings,
            summaries,
            MockAlertPort::new(),
            &["Delhi", "Mumbai", "Chennai"],
        );
        let report = monitor.run_cycle().await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcome_for("Mumbai"),
            Some(LocationOutcome::Failed {
                stage: CycleStage::Fetch,
                ..
            })
        ));
        assert!(report.outcome_for("Delhi").unwrap().is_success());

        let stats = monitor.stats().snapshot();
        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.locations_succeeded, 2);
        assert_eq!(stats.locations_failed, 1);
        assert!(stats.last_error.unwrap().starts_with("Mumbai (fetch)"));
    }

    #[tokio::test]
    async fn store_failure_skips_aggregation_and_detection() {
        let mut weather_port = MockWeatherPort::new();
        weather_port
            .expect_current_by_city()
            .returning(|_| Ok(weather(30.0)));

        let mut readings = MockReadingStore::new();
        readings
            .expect_save()
            .returning(|_| Err(ApplicationError::Persistence("disk full".into())));
        readings.expect_in_range().never();
        readings.expect_latest().never();

        let monitor = monitor(
            weather_port,
            readings,
            MockSummaryStore::new(),
            MockAlertPort::new(),
            &["Delhi"],
        );
        let report = monitor.run_cycle().await;

        assert!(matches!(
            report.outcome_for("Delhi"),
            Some(LocationOutcome::Failed {
                stage: CycleStage::Store,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn reading_is_stored_under_configured_name() {
        let mut weather_port = MockWeatherPort::new();
        weather_port
            .expect_current_by_city()
            .withf(|city| city == "Bangalore")
            .returning(|_| Ok(weather(24.0)));

        let mut readings = MockReadingStore::new();
        readings
            .expect_save()
            .withf(|r| r.location == "Bangalore" && r.wind_speed == Some(3.0))
            .times(1)
            .returning(|_| Ok(()));
        readings.expect_in_range().returning(|_, _, _| Ok(Vec::new()));
        readings.expect_latest().returning(|_, _| Ok(Vec::new()));

        let monitor = monitor(
            weather_port,
            readings,
            MockSummaryStore::new(),
            MockAlertPort::new(),
            &["Bangalore"],
        );
        assert!(monitor.process_location("Bangalore").await.is_success());
    }

    #[tokio::test]
    async fn aggregates_today_for_current_reading() {
        let observed = Utc::now();
        let (today_start, _) = domain::entities::day_bounds(observed.date_naive());

        let mut weather_port = MockWeatherPort::new();
        weather_port.expect_current_by_city().returning(move |_| {
            Ok(CurrentWeather {
                observed_at: observed,
                ..weather(20.0)
            })
        });
        let mut readings = MockReadingStore::new();
        readings.expect_save().returning(|_| Ok(()));
        readings
            .expect_in_range()
            .withf(move |_, start, _| *start == today_start)
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        readings.expect_latest().returning(|_, _| Ok(Vec::new()));

        let monitor = monitor(
            weather_port,
            readings,
            MockSummaryStore::new(),
            MockAlertPort::new(),
            &["Delhi"],
        );
        assert!(monitor.process_location("Delhi").await.is_success());
    }

    #[tokio::test]
    async fn late_reading_refreshes_its_day_and_today() {
        let observed = Utc::now() - chrono::Duration::days(1);
        let (reading_start, _) = domain::entities::day_bounds(observed.date_naive());
        let (today_start, _) = domain::entities::day_bounds(Utc::now().date_naive());

        let mut weather_port = MockWeatherPort::new();
        weather_port.expect_current_by_city().returning(move |_| {
            Ok(CurrentWeather {
                observed_at: observed,
                ..weather(20.0)
            })
        });
        let mut readings = MockReadingStore::new();
        readings.expect_save().returning(|_| Ok(()));
        readings
            .expect_in_range()
            .withf(move |_, start, _| *start == reading_start)
            .times(1)
            .returning(move |location, _, _| {
                Ok(vec![Reading::observed_at(location, 20.0, "Clear", observed).unwrap()])
            });
        readings
            .expect_in_range()
            .withf(move |_, start, _| *start == today_start)
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        readings.expect_latest().returning(|_, _| Ok(Vec::new()));

        let mut summaries = MockSummaryStore::new();
        summaries
            .expect_upsert()
            .withf(move |s| s.date == observed.date_naive())
            .times(1)
            .returning(|_| Ok(()));

        let monitor = monitor(
            weather_port,
            readings,
            summaries,
            MockAlertPort::new(),
            &["Delhi"],
        );
        assert!(monitor.process_location("Delhi").await.is_success());
    }

    #[tokio::test]
    async fn hot_pair_raises_alert_through_cycle() {
        let mut weather_port = MockWeatherPort::new();
        weather_port
            .expect_current_by_city()
            .returning(|_| Ok(weather(37.0)));

        let mut readings = MockReadingStore::new();
        readings.expect_save().returning(|_| Ok(()));
        readings.expect_in_range().returning(|_, _, _| Ok(Vec::new()));
        readings.expect_latest().returning(|_, _| {
            Ok(vec![
                Reading::new("Delhi", 37.0, "Clear").unwrap(),
                Reading::new("Delhi", 36.0, "Clear").unwrap(),
            ])
        });
        readings.expect_mark_breached().times(1).returning(|_| Ok(true));

        let mut alerts = MockAlertPort::new();
        alerts.expect_notify().times(1).returning(|_| Ok(()));

        let monitor = monitor(
            weather_port,
            readings,
            MockSummaryStore::new(),
            alerts,
            &["Delhi"],
        );
        let report = monitor.run_cycle().await;
        assert_eq!(report.alerts_raised(), 1);
        assert_eq!(monitor.stats().snapshot().alerts_raised, 1);
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        struct SlowWeather;

        #[async_trait::async_trait]
        impl WeatherPort for SlowWeather {
            async fn current_by_city(&self, _city: &str) -> Result<CurrentWeather, ApplicationError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(weather(20.0))
            }

            async fn current_by_coordinates(
                &self,
                _location: &domain::value_objects::GeoLocation,
            ) -> Result<CurrentWeather, ApplicationError> {
                Ok(weather(20.0))
            }

            async fn forecast_by_city(
                &self,
                _city: &str,
            ) -> Result<crate::ports::Forecast, ApplicationError> {
                Err(ApplicationError::ExternalService("unused".into()))
            }

            async fn is_available(&self) -> bool {
                true
            }
        }

        let readings: Arc<dyn ReadingStore> = Arc::new(MockReadingStore::new());
        let aggregator = DailyAggregator::new(Arc::clone(&readings), Arc::new(MockSummaryStore::new()));
        let detector = Arc::new(BreachDetector::new(
            Arc::clone(&readings),
            Arc::new(MockAlertPort::new()),
            Thresholds::default(),
        ));
        let monitor = WeatherMonitor::new(
            Arc::new(SlowWeather),
            readings,
            aggregator,
            detector,
            config(&["Delhi"]),
        );

        let outcome = monitor.process_location("Delhi").await;
        match outcome {
            LocationOutcome::Failed { stage, error } => {
                assert_eq!(stage, CycleStage::Fetch);
                assert!(error.contains("timed out"));
            },
            LocationOutcome::Processed { .. } => unreachable!("expected timeout"),
        }
    }

    #[test]
    fn empty_stats_snapshot() {
        let stats = MonitorStats::default().snapshot();
        assert_eq!(stats.cycles, 0);
        assert!(stats.last_cycle_at.is_none());
        assert!(stats.last_error.is_none());
    }

    #[test]
    fn stage_display() {
        assert_eq!(CycleStage::Aggregate.to_string(), "aggregate");
        assert_eq!(
            serde_json::to_string(&CycleStage::Detect).unwrap(),
            "\"detect\""
        );
    }
}
