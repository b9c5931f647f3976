use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;

use crate::catalog::SatelliteEntry;
use crate::clock::Clock;
use crate::elements::{ElementSource, OrbitalElementSet};
use crate::predict::elevation::LEO_ALTITUDE_KM;
use crate::predict::error::PredictError;
use crate::predict::fallback::predict_passes_fallback;
use crate::predict::primary::{predict_passes_primary, PrimaryOutcome};
use crate::predict::types::{DisplayPass, ObserverLocation, PassRecord, PredictionWindow};
use crate::propagator::{GeoPoint, Propagator};
use crate::render::{build_flyover_scene, ground_track, FlyoverScene, RenderSink};
use crate::tracker::{LiveTracker, DEFAULT_TRACK_INTERVAL};

/// Try the propagator's own pass finder, scanning manually when it has
/// nothing usable to offer.
pub fn compute_passes<P>(
    propagator: &P,
    elements: &OrbitalElementSet,
    observer: &ObserverLocation,
    window: &PredictionWindow,
    altitude_km: f64,
) -> Result<Vec<PassRecord>, PredictError>
where
    P: Propagator + ?Sized,
{
    match predict_passes_primary(propagator, elements, observer, window) {
        PrimaryOutcome::Usable(passes) => return Ok(passes),
        PrimaryOutcome::Unusable => {
            log::info!("Pass finder returned no usable passes");
        }
        PrimaryOutcome::Failed(e) => {
            log::warn!("Pass finder failed: {}", e);
        }
    }

    predict_passes_fallback(propagator, elements, observer, window, altitude_km).inspect_err(|e| {
        log::error!("Fallback pass calculation failed: {}", e);
    })
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub altitude_km: f64,
    pub track_interval: StdDuration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            altitude_km: LEO_ALTITUDE_KM,
            track_interval: DEFAULT_TRACK_INTERVAL,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    satellite: SatelliteEntry,
    /// Bumped on every satellite switch; in-flight work tagged with an older
    /// value must not touch the state.
    generation: u64,
    busy: bool,
    elements: Option<OrbitalElementSet>,
    passes: Vec<DisplayPass>,
    observer: Option<ObserverLocation>,
    orbit: Vec<GeoPoint>,
}

/// Holds the busy flag for one prediction; released on every exit path.
struct BusyGuard<'a> {
    state: &'a StdMutex<SessionState>,
    generation: u64,
    satellite: SatelliteEntry,
}

impl<'a> BusyGuard<'a> {
    fn acquire(state: &'a StdMutex<SessionState>) -> Result<Self, PredictError> {
        let mut locked = state.lock().unwrap();
        if locked.busy {
            return Err(PredictError::Busy);
        }
        locked.busy = true;
        Ok(Self {
            state,
            generation: locked.generation,
            satellite: locked.satellite.clone(),
        })
    }

    fn superseded(&self) -> PredictError {
        PredictError::Superseded {
            satellite: self.satellite.name.clone(),
        }
    }

    fn ensure_current(&self) -> Result<(), PredictError> {
        if self.state.lock().unwrap().generation != self.generation {
            return Err(self.superseded());
        }
        Ok(())
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut locked = self.state.lock().unwrap_or_else(|e| e.into_inner());
        // A satellite switch already reset the flag for the new context.
        if locked.generation == self.generation {
            locked.busy = false;
        }
    }
}

/// The tracked-satellite context: current elements, pass list, orbit track
/// and the live tracker, plus everything that mutates them.
pub struct FlyoverSession<S> {
    source: S,
    propagator: Arc<dyn Propagator>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn RenderSink>,
    altitude_km: f64,
    state: StdMutex<SessionState>,
    tracker: tokio::sync::Mutex<LiveTracker>,
}

impl<S: ElementSource> FlyoverSession<S> {
    pub fn new(
        source: S,
        propagator: Arc<dyn Propagator>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn RenderSink>,
        satellite: SatelliteEntry,
        settings: SessionSettings,
    ) -> Self {
        let tracker = LiveTracker::new(
            propagator.clone(),
            clock.clone(),
            sink.clone(),
            settings.track_interval,
            settings.altitude_km,
        );
        Self {
            source,
            propagator,
            clock,
            sink,
            altitude_km: settings.altitude_km,
            state: StdMutex::new(SessionState {
                satellite,
                generation: 0,
                busy: false,
                elements: None,
                passes: Vec::new(),
                observer: None,
                orbit: Vec::new(),
            }),
            tracker: tokio::sync::Mutex::new(tracker),
        }
    }

    pub fn satellite(&self) -> SatelliteEntry {
        self.state.lock().unwrap().satellite.clone()
    }

    pub fn passes(&self) -> Vec<DisplayPass> {
        self.state.lock().unwrap().passes.clone()
    }

    pub fn elements(&self) -> Option<OrbitalElementSet> {
        self.state.lock().unwrap().elements.clone()
    }

    pub fn orbit(&self) -> Vec<GeoPoint> {
        self.state.lock().unwrap().orbit.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().unwrap().busy
    }

    /// Predict visible passes of the tracked satellite over `observer` for
    /// the next `days` days and publish them as the current pass list.
    pub async fn predict_passes(
        &self,
        observer: ObserverLocation,
        days: u32,
    ) -> Result<Vec<DisplayPass>, PredictError> {
        observer.validate()?;
        let window = PredictionWindow::from_days(self.clock.now(), days)?;

        let guard = BusyGuard::acquire(&self.state)?;
        {
            let mut locked = self.state.lock().unwrap();
            locked.passes.clear();
            self.sink.show_passes(&[]);
        }

        log::info!(
            "Predicting passes of {} for {:.4}, {:.4} over {} days",
            guard.satellite.name,
            observer.latitude_deg,
            observer.longitude_deg,
            days
        );

        let elements = self
            .source
            .fetch(&guard.satellite.norad_id)
            .await
            .inspect_err(|e| log::warn!("Error fetching TLE data: {}", e))?;
        guard.ensure_current()?;

        let propagator = self.propagator.clone();
        let altitude_km = self.altitude_km;
        let scan_elements = elements.clone();
        let passes = tokio::task::spawn_blocking(move || {
            compute_passes(
                propagator.as_ref(),
                &scan_elements,
                &observer,
                &window,
                altitude_km,
            )
        })
        .await
        .map_err(|e| PredictError::Prediction(e.to_string()))??;

        let display: Vec<DisplayPass> = passes.into_iter().map(DisplayPass::from).collect();

        let mut locked = self.state.lock().unwrap();
        if locked.generation != guard.generation {
            log::info!(
                "Discarding passes of {}, tracked satellite changed",
                guard.satellite.name
            );
            return Err(guard.superseded());
        }
        locked.elements = Some(elements);
        locked.passes = display.clone();
        locked.observer = Some(observer);
        self.sink.show_passes(&display);
        drop(locked);

        log::info!("Found {} passes of {}", display.len(), guard.satellite.name);
        Ok(display)
    }

    /// Switch the tracked satellite. In-flight predictions for the previous
    /// one are invalidated and the live tracker is replaced.
    pub async fn select_satellite(&self, satellite: SatelliteEntry) -> Result<(), PredictError> {
        let generation = {
            let mut locked = self.state.lock().unwrap();
            locked.generation += 1;
            locked.satellite = satellite.clone();
            locked.busy = false;
            locked.elements = None;
            locked.passes.clear();
            locked.orbit.clear();
            self.sink.clear_satellite();
            locked.generation
        };
        log::info!("Tracking {} ({})", satellite.name, satellite.norad_id);

        let mut tracker = self.tracker.lock().await;
        tracker.stop().await;
        {
            // The old worker may have ticked between the clear and the stop.
            let locked = self.state.lock().unwrap();
            if locked.generation == generation {
                self.sink.clear_position();
            }
        }

        let elements = self
            .source
            .fetch(&satellite.norad_id)
            .await
            .inspect_err(|e| log::warn!("Error fetching TLE data: {}", e))?;

        let orbit = match elements.orbital_period() {
            Some(period) => {
                let propagator = self.propagator.clone();
                let track_elements = elements.clone();
                let now = self.clock.now();
                tokio::task::spawn_blocking(move || {
                    ground_track(propagator.as_ref(), &track_elements, now, period)
                })
                .await
                .map_err(|e| PredictError::Prediction(e.to_string()))?
            }
            None => {
                log::warn!("No orbital period for {}, skipping orbit track", satellite.name);
                Vec::new()
            }
        };

        {
            let mut locked = self.state.lock().unwrap();
            if locked.generation != generation {
                return Err(PredictError::Superseded {
                    satellite: satellite.name,
                });
            }
            locked.elements = Some(elements.clone());
            locked.orbit = orbit.clone();
            self.sink.show_orbit(&orbit);
        }

        tracker
            .start(satellite.name, elements)
            .await
            .map_err(|e| PredictError::Prediction(e.to_string()))
    }

    /// Geometry for the pass at `index` of the current pass list.
    pub async fn select_flyover(&self, index: usize) -> Result<FlyoverScene, PredictError> {
        let (generation, satellite, elements, pass, observer) = {
            let locked = self.state.lock().unwrap();
            let elements = locked.elements.clone().ok_or_else(|| {
                PredictError::Validation(
                    "TLE data not available. Please calculate flyovers first.".into(),
                )
            })?;
            let pass = locked
                .passes
                .get(index)
                .map(|p| p.pass.clone())
                .ok_or(PredictError::NoSuchPass(index))?;
            (
                locked.generation,
                locked.satellite.name.clone(),
                elements,
                pass,
                locked.observer,
            )
        };

        let propagator = self.propagator.clone();
        let altitude_km = self.altitude_km;
        let name = satellite.clone();
        let scene = tokio::task::spawn_blocking(move || {
            build_flyover_scene(
                propagator.as_ref(),
                &elements,
                &name,
                &pass,
                observer.as_ref(),
                altitude_km,
            )
        })
        .await
        .map_err(|e| PredictError::Prediction(e.to_string()))?;

        let locked = self.state.lock().unwrap();
        if locked.generation != generation {
            return Err(PredictError::Superseded { satellite });
        }
        self.sink.show_flyover(&scene);
        Ok(scene)
    }

    pub fn reset_view(&self) {
        self.sink.reset_view();
    }

    pub async fn shutdown(&self) {
        let mut tracker = self.tracker.lock().await;
        if tracker.is_running() {
            log::info!("Stopping live tracker");
        }
        tracker.stop().await;
    }
}
