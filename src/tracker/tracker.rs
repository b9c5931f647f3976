use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::error::TrackerError;
use crate::clock::Clock;
use crate::elements::OrbitalElementSet;
use crate::propagator::{GeoPoint, Propagator};
use crate::render::RenderSink;

pub const DEFAULT_TRACK_INTERVAL: StdDuration = StdDuration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct TrackedPosition {
    pub time: DateTime<Utc>,
    pub satellite: String,
    pub position: GeoPoint,
    pub altitude_km: f64,
    pub status: String,
}

impl TrackedPosition {
    fn new(satellite: &str, time: DateTime<Utc>, position: GeoPoint, altitude_km: f64) -> Self {
        Self {
            status: format!(
                "{} Live Tracking: {:.2}°, {:.2}°",
                satellite, position.latitude_deg, position.longitude_deg
            ),
            time,
            satellite: satellite.to_string(),
            position,
            altitude_km,
        }
    }
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<Result<(), TrackerError>>,
}

/// Periodically publishes the tracked satellite's current sub-point.
///
/// At most one worker runs at a time; starting a new one stops the old one
/// first, so positions of a previously tracked satellite never reach the sink
/// after [`LiveTracker::start`] returns.
pub struct LiveTracker {
    propagator: Arc<dyn Propagator>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn RenderSink>,
    period: StdDuration,
    altitude_km: f64,
    worker: Option<WorkerHandle>,
}

impl LiveTracker {
    pub fn new(
        propagator: Arc<dyn Propagator>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn RenderSink>,
        period: StdDuration,
        altitude_km: f64,
    ) -> Self {
        Self {
            propagator,
            clock,
            sink,
            // tokio intervals reject a zero period.
            period: period.max(StdDuration::from_millis(1)),
            altitude_km,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.join.is_finished())
            .unwrap_or(false)
    }

    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            match worker.join.await {
                Ok(Err(e)) => log::warn!("Live tracker ended with error: {}", e),
                Err(e) => log::warn!("Live tracker task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }

    /// Replace whatever is being tracked with `elements`.
    pub async fn start(
        &mut self,
        satellite: String,
        elements: OrbitalElementSet,
    ) -> Result<(), TrackerError> {
        self.stop().await;

        // Reject unusable elements before spawning anything.
        if let Err(e) = self.propagator.sub_point(&elements, self.clock.now()) {
            if !e.is_sample_error() {
                return Err(e.into());
            }
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let ctx = TrackerLoop {
            propagator: self.propagator.clone(),
            clock: self.clock.clone(),
            sink: self.sink.clone(),
            period: self.period,
            altitude_km: self.altitude_km,
            satellite,
            elements,
        };
        let join = tokio::spawn(ctx.run(stop_rx));

        self.worker = Some(WorkerHandle { stop_tx, join });
        Ok(())
    }
}

struct TrackerLoop {
    propagator: Arc<dyn Propagator>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn RenderSink>,
    period: StdDuration,
    altitude_km: f64,
    satellite: String,
    elements: OrbitalElementSet,
}

impl TrackerLoop {
    async fn run(self, mut stop_rx: oneshot::Receiver<()>) -> Result<(), TrackerError> {
        log::info!("Live tracking {}", self.satellite);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let should_stop = tokio::select! {
                _ = ticker.tick() => false,
                _ = &mut stop_rx => true,
            };
            if should_stop {
                log::debug!("Live tracking of {} stopped", self.satellite);
                return Ok(());
            }

            let now = self.clock.now();
            match self.propagator.sub_point(&self.elements, now) {
                Ok(point) => {
                    let position = TrackedPosition::new(&self.satellite, now, point, self.altitude_km);
                    self.sink.update_position(&position);
                }
                Err(e) if e.is_sample_error() => {
                    log::debug!("No live position for {}: {}", self.satellite, e);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::propagator::PropagationError;
    use crate::render::{Scene, SceneStore};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixed(GeoPoint);

    impl Propagator for Fixed {
        fn sub_point(
            &self,
            _elements: &OrbitalElementSet,
            _time: DateTime<Utc>,
        ) -> Result<GeoPoint, PropagationError> {
            Ok(self.0)
        }
    }

    /// Reports the first element line's second token as latitude, so each
    /// element set lands somewhere recognisable.
    struct ByElements {
        saw_other: AtomicBool,
    }

    impl Propagator for ByElements {
        fn sub_point(
            &self,
            elements: &OrbitalElementSet,
            _time: DateTime<Utc>,
        ) -> Result<GeoPoint, PropagationError> {
            let lat: f64 = elements
                .line1
                .split_whitespace()
                .nth(1)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| PropagationError::InvalidElements("no latitude".into()))?;
            if lat != 10.0 {
                self.saw_other.store(true, Ordering::SeqCst);
            }
            Ok(GeoPoint::new(lat, 0.0))
        }
    }

    fn tracker(propagator: Arc<dyn Propagator>, sink: Arc<SceneStore>) -> LiveTracker {
        LiveTracker::new(
            propagator,
            Arc::new(SystemClock),
            sink,
            StdDuration::from_millis(10),
            400.0,
        )
    }

    #[test]
    fn status_has_two_decimals() {
        let p = TrackedPosition::new("ISS (ZARYA)", Utc::now(), GeoPoint::new(51.23456, -0.1), 400.0);
        assert_eq!(p.status, "ISS (ZARYA) Live Tracking: 51.23°, -0.10°");
    }

    #[tokio::test]
    async fn publishes_positions_until_stopped() {
        let sink = Arc::new(SceneStore::new());
        let mut tracker = tracker(Arc::new(Fixed(GeoPoint::new(12.5, 45.0))), sink.clone());

        tracker
            .start("ISS".into(), OrbitalElementSet::new("1 a", "2 a"))
            .await
            .unwrap();
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        assert!(tracker.is_running());
        let Scene { position, .. } = sink.snapshot();
        let position = position.unwrap();
        assert_eq!(position.satellite, "ISS");
        assert_eq!(position.position, GeoPoint::new(12.5, 45.0));

        tracker.stop().await;
        assert!(!tracker.is_running());
    }

    #[tokio::test]
    async fn restarting_replaces_the_previous_worker() {
        let sink = Arc::new(SceneStore::new());
        let propagator = Arc::new(ByElements {
            saw_other: AtomicBool::new(false),
        });
        let mut tracker = tracker(propagator.clone(), sink.clone());

        tracker
            .start("A".into(), OrbitalElementSet::new("1 20", "2 a"))
            .await
            .unwrap();
        tokio::time::sleep(StdDuration::from_millis(30)).await;
        tracker
            .start("B".into(), OrbitalElementSet::new("1 10", "2 b"))
            .await
            .unwrap();
        propagator.saw_other.store(false, Ordering::SeqCst);
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        assert!(!propagator.saw_other.load(Ordering::SeqCst));
        assert_eq!(sink.snapshot().position.unwrap().satellite, "B");
        tracker.stop().await;
    }

    #[tokio::test]
    async fn unusable_elements_are_rejected() {
        let sink = Arc::new(SceneStore::new());
        let propagator = Arc::new(ByElements {
            saw_other: AtomicBool::new(false),
        });
        let mut tracker = tracker(propagator, sink);

        let err = tracker
            .start("X".into(), OrbitalElementSet::new("1", "2"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Propagation(_)));
        assert!(!tracker.is_running());
    }
}
