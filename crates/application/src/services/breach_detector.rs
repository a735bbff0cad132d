//! Breach detection service
//!
//! Looks at the two most recent readings of a location and raises a
//! temperature alert when both exceed the threshold, using the reading's
//! latch to avoid alerting twice on the same pair. A matching condition on
//! both readings is reported on every run.

use std::{collections::HashMap, fmt, sync::Arc};

use domain::entities::{BreachAlert, BreachAssessment};
use domain::value_objects::Thresholds;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{AlertPort, ReadingStore},
};

/// What a detection run did for one location
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BreachOutcome {
    /// Fewer than two readings were stored, nothing was evaluated
    pub insufficient_data: bool,
    /// Temperature alert raised during this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<BreachAlert>,
    /// Both readings matched the threshold condition
    pub condition_breach: bool,
}

impl BreachOutcome {
    /// Whether a temperature alert was raised
    #[must_use]
    pub const fn alert_raised(&self) -> bool {
        self.alert.is_some()
    }
}

/// Detects consecutive threshold breaches per location
pub struct BreachDetector {
    readings: Arc<dyn ReadingStore>,
    alerts: Arc<dyn AlertPort>,
    thresholds: Thresholds,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl fmt::Debug for BreachDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreachDetector")
            .field("thresholds", &self.thresholds)
            .field("tracked_locations", &self.locks.lock().len())
            .finish_non_exhaustive()
    }
}

impl BreachDetector {
    /// Create a new detector
    #[must_use]
    pub fn new(
        readings: Arc<dyn ReadingStore>,
        alerts: Arc<dyn AlertPort>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            readings,
            alerts,
            thresholds,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Thresholds in effect
    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    fn location_lock(&self, location: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(location.to_string()).or_default())
    }

    /// Evaluate the latest pair of readings for a location
    ///
    /// The read, decision and latch write run under a per-location lock, so
    /// concurrent checks of the same location never alert twice on one pair.
    /// The latch is persisted before this returns `Ok`.
    #[instrument(skip(self))]
    pub async fn check(&self, location: &str) -> Result<BreachOutcome, ApplicationError> {
        let lock = self.location_lock(location);
        let _guard = lock.lock().await;

        let recent = self.readings.latest(location, 2).await?;
        let [latest, previous] = recent.as_slice() else {
            debug!(count = recent.len(), "Not enough readings for breach check");
            return Ok(BreachOutcome {
                insufficient_data: true,
                ..BreachOutcome::default()
            });
        };

        let assessment = BreachAssessment::evaluate(latest, previous, &self.thresholds);
        let mut outcome = BreachOutcome {
            condition_breach: assessment.condition_breach,
            ..BreachOutcome::default()
        };

        if assessment.condition_breach {
            warn!(
                condition = %latest.condition,
                "Condition threshold met for two consecutive readings"
            );
        }

        if assessment.temperature_breach && assessment.already_latched {
            debug!(reading_id = %latest.id, "Breach already alerted for this reading");
        }

        if assessment.should_alert() {
            let alert = BreachAlert::new(latest, previous, &self.thresholds);
            if let Err(e) = self.alerts.notify(&alert).await {
                warn!(error = %e, "Failed to deliver breach alert");
            }

            self.readings.mark_breached(&latest.id).await?;
            info!(
                temperature = latest.temperature,
                previous_temperature = previous.temperature,
                threshold = self.thresholds.temperature(),
                "Temperature breach alert raised"
            );
            outcome.alert = Some(alert);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use domain::entities::Reading;
    use domain::value_objects::ReadingId;

    use super::*;
    use crate::ports::{MockAlertPort, MockReadingStore};

    fn reading(temp: f64, condition: &str) -> Reading {
        Reading::new("X", temp, condition).unwrap()
    }

    fn detector(readings: MockReadingStore, alerts: MockAlertPort) -> BreachDetector {
        BreachDetector::new(Arc::new(readings), Arc::new(alerts), Thresholds::default())
    }

    #[tokio::test]
    async fn fewer_than_two_readings_is_a_no_op() {
        let mut readings = MockReadingStore::new();
        readings
            .expect_latest()
            .withf(|location, limit| location == "X" && *limit == 2)
            .returning(|_, _| Ok(vec![reading(40.0, "Clear")]));
        readings.expect_mark_breached().never();
        let mut alerts = MockAlertPort::new();
        alerts.expect_notify().never();

        let outcome = detector(readings, alerts).check("X").await.unwrap();
        assert!(outcome.insufficient_data);
        assert!(!outcome.alert_raised());
        assert!(!outcome.condition_breach);
    }

    #[tokio::test]
    async fn no_readings_is_a_no_op() {
        let mut readings = MockReadingStore::new();
        readings.expect_latest().returning(|_, _| Ok(Vec::new()));
        let alerts = MockAlertPort::new();

        let outcome = detector(readings, alerts).check("X").await.unwrap();
        assert!(outcome.insufficient_data);
    }

    #[tokio::test]
    async fn two_hot_readings_raise_one_alert_and_latch() {
        let latest = reading(37.0, "Clear");
        let latest_id = latest.id;
        let pair = vec![latest, reading(36.0, "Clear")];

        let mut readings = MockReadingStore::new();
        readings
            .expect_latest()
            .returning(move |_, _| Ok(pair.clone()));
        readings
            .expect_mark_breached()
            .withf(move |id| *id == latest_id)
            .times(1)
            .returning(|_| Ok(true));
        let mut alerts = MockAlertPort::new();
        alerts
            .expect_notify()
            .withf(|alert| alert.location == "X" && (alert.temperature - 37.0).abs() < 1e-9)
            .times(1)
            .returning(|_| Ok(()));

        let outcome = detector(readings, alerts).check("X").await.unwrap();
        assert!(outcome.alert_raised());
        assert_eq!(outcome.alert.unwrap().reading_id, latest_id);
        assert!(!outcome.condition_breach);
    }

    #[tokio::test]
    async fn latched_pair_does_not_alert_again() {
        let mut latest = reading(37.0, "Clear");
        latest.mark_breached();
        let pair = vec![latest, reading(36.0, "Clear")];

        let mut readings = MockReadingStore::new();
        readings
            .expect_latest()
            .returning(move |_, _| Ok(pair.clone()));
        readings.expect_mark_breached().never();
        let mut alerts = MockAlertPort::new();
        alerts.expect_notify().never();

        let outcome = detector(readings, alerts).check("X").await.unwrap();
        assert!(!outcome.alert_raised());
    }

    #[tokio::test]
    async fn condition_breach_reported_regardless_of_latch() {
        let mut latest = reading(10.0, "Rain");
        latest.mark_breached();
        let pair = vec![latest, reading(11.0, "Rain")];

        let mut readings = MockReadingStore::new();
        readings
            .expect_latest()
            .times(2)
            .returning(move |_, _| Ok(pair.clone()));
        readings.expect_mark_breached().never();
        let mut alerts = MockAlertPort::new();
        alerts.expect_notify().never();

        let detector = detector(readings, alerts);
        assert!(detector.check("X").await.unwrap().condition_breach);
        assert!(detector.check("X").await.unwrap().condition_breach);
    }

    #[tokio::test]
    async fn latch_write_failure_propagates() {
        let pair = vec![reading(37.0, "Clear"), reading(36.0, "Clear")];
        let mut readings = MockReadingStore::new();
        readings
            .expect_latest()
            .returning(move |_, _| Ok(pair.clone()));
        readings
            .expect_mark_breached()
            .returning(|_| Err(ApplicationError::Persistence("readonly".into())));
        let mut alerts = MockAlertPort::new();
        alerts.expect_notify().returning(|_| Ok(()));

        let err = detector(readings, alerts).check("X").await.unwrap_err();
        assert!(matches!(err, ApplicationError::Persistence(_)));
    }

    #[tokio::test]
    async fn notify_failure_still_latches() {
        let pair = vec![reading(37.0, "Clear"), reading(36.0, "Clear")];
        let mut readings = MockReadingStore::new();
        readings
            .expect_latest()
            .returning(move |_, _| Ok(pair.clone()));
        readings
            .expect_mark_breached()
            .times(1)
            .returning(|_| Ok(true));
        let mut alerts = MockAlertPort::new();
        alerts
            .expect_notify()
            .returning(|_| Err(ApplicationError::ExternalService("down".into())));

        let outcome = detector(readings, alerts).check("X").await.unwrap();
        assert!(outcome.alert_raised());
    }

    /// In-memory store that honours the latch, used to exercise the lock
    struct LatchingStore {
        pair: parking_lot::Mutex<Vec<Reading>>,
        marks: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ReadingStore for LatchingStore {
        async fn save(&self, _reading: &Reading) -> Result<(), ApplicationError> {
            Ok(())
        }

        async fn latest(&self, _location: &str, _limit: u32) -> Result<Vec<Reading>, ApplicationError> {
            let pair = self.pair.lock().clone();
            tokio::task::yield_now().await;
            Ok(pair)
        }

        async fn in_range(
            &self,
            _location: &str,
            _start: chrono::DateTime<chrono::Utc>,
            _end: chrono::DateTime<chrono::Utc>,
        ) -> Result<Vec<Reading>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn mark_breached(&self, id: &ReadingId) -> Result<bool, ApplicationError> {
            tokio::task::yield_now().await;
            let mut pair = self.pair.lock();
            let flipped = pair
                .iter_mut()
                .find(|r| r.id == *id)
                .is_some_and(Reading::mark_breached);
            if flipped {
                self.marks.fetch_add(1, Ordering::SeqCst);
            }
            Ok(flipped)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checks_alert_once() {
        let store = Arc::new(LatchingStore {
            pair: parking_lot::Mutex::new(vec![reading(37.0, "Clear"), reading(36.0, "Clear")]),
            marks: AtomicUsize::new(0),
        });
        let mut alerts = MockAlertPort::new();
        alerts.expect_notify().times(1).returning(|_| Ok(()));

        let detector = Arc::new(BreachDetector::new(
            Arc::clone(&store) as Arc<dyn ReadingStore>,
            Arc::new(alerts),
            Thresholds::default(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let detector = Arc::clone(&detector);
                tokio::spawn(async move { detector.check("X").await })
            })
            .collect();

        let mut raised = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().alert_raised() {
                raised += 1;
            }
        }

        assert_eq!(raised, 1);
        assert_eq!(store.marks.load(Ordering::SeqCst), 1);
    }
}
