use chrono::Duration;

use crate::elements::OrbitalElementSet;
use crate::predict::elevation::elevation_deg;
use crate::predict::error::PredictError;
use crate::predict::segmenter::{ElevationSample, PassSegmenter};
use crate::predict::types::{
    ObserverLocation, PassRecord, PredictionWindow, VISIBILITY_THRESHOLD_DEG,
};
use crate::propagator::Propagator;

pub const FALLBACK_STEP: Duration = Duration::minutes(5);

/// Number of grid points for the window, `days * 24 * 60 / 5` for whole days.
pub fn grid_len(window: &PredictionWindow, step: Duration) -> i64 {
    window.length().num_seconds() / step.num_seconds()
}

/// Scan the window on a 5 minute grid using only the propagator's
/// sub-point, and segment the resulting elevation signal into passes.
///
/// Instants the propagator cannot resolve are skipped without disturbing a
/// pass in progress. Invalid elements abort the whole scan.
pub fn predict_passes_fallback<P>(
    propagator: &P,
    elements: &OrbitalElementSet,
    observer: &ObserverLocation,
    window: &PredictionWindow,
    altitude_km: f64,
) -> Result<Vec<PassRecord>, PredictError>
where
    P: Propagator + ?Sized,
{
    log::info!("Using fallback pass calculation over {} steps", grid_len(window, FALLBACK_STEP));

    let segmenter = PassSegmenter::new(FALLBACK_STEP, VISIBILITY_THRESHOLD_DEG);
    let observer_lat = observer.lat_rad();
    let observer_lon = observer.lon_rad();

    let mut samples = Vec::new();
    for i in 0..grid_len(window, FALLBACK_STEP) {
        let time = window.start + Duration::seconds(FALLBACK_STEP.num_seconds() * i);
        match propagator.sub_point(elements, time) {
            Ok(point) => samples.push(ElevationSample {
                time,
                elevation_deg: elevation_deg(
                    observer_lat,
                    observer_lon,
                    point.lat_rad(),
                    point.lon_rad(),
                    altitude_km,
                ),
            }),
            Err(e) if e.is_sample_error() => {
                log::debug!("Skipping sample at {}: {}", time, e);
            }
            Err(e) => return Err(PredictError::Prediction(e.to_string())),
        }
    }

    let passes = segmenter.segment(samples);
    log::info!("Fallback calculation found {} passes", passes.len());
    Ok(passes)
}
