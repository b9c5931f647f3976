use chrono::{DateTime, Duration, Utc};

use crate::predict::ObserverLocation;
use crate::propagator::frames::look_angles;
use crate::propagator::sgp4_backend::Prepared;
use crate::propagator::{PropagationError, RawPass};

const COARSE_STEP_SECONDS: i64 = 60; // 1 minute for initial scan
const FINE_STEP_SECONDS: i64 = 1; // 1 second for refinement

struct LookSample {
    azimuth_deg: f64,
    elevation_deg: f64,
}

fn observe(
    prepared: &Prepared,
    observer: &ObserverLocation,
    time: DateTime<Utc>,
) -> Result<LookSample, PropagationError> {
    let (azimuth_deg, elevation_deg) = look_angles(observer, prepared.position_ecef(time)?);
    Ok(LookSample {
        azimuth_deg,
        elevation_deg,
    })
}

/// Find passes above `min_elevation` within a time range
pub(crate) fn find_passes(
    prepared: &Prepared,
    observer: &ObserverLocation,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
    max_results: usize,
) -> Result<Vec<RawPass>, PropagationError> {
    let mut passes = Vec::new();
    let mut cursor = start;
    let coarse_step = Duration::seconds(COARSE_STEP_SECONDS);

    let mut prev_visible = false;
    let mut pass_start: Option<(DateTime<Utc>, f64)> = None;
    let mut max_el = 0.0;
    let mut max_el_time = cursor;

    while cursor <= end && passes.len() < max_results {
        let sample = observe(prepared, observer, cursor)?;
        let visible = sample.elevation_deg >= min_elevation;

        if visible && !prev_visible {
            // Already above the threshold at the window start: no crossing to refine
            let aos = if cursor == start {
                (cursor, sample.azimuth_deg)
            } else {
                refine_crossing(prepared, observer, cursor - coarse_step, cursor, true, min_elevation)?
            };
            pass_start = Some(aos);
            max_el = sample.elevation_deg;
            max_el_time = cursor;
        } else if visible {
            if sample.elevation_deg > max_el {
                max_el = sample.elevation_deg;
                max_el_time = cursor;
            }
        } else if let Some((aos, aos_az)) = pass_start.take() {
            let (los, los_az) =
                refine_crossing(prepared, observer, cursor - coarse_step, cursor, false, min_elevation)?;
            passes.push(RawPass {
                start: aos,
                duration_seconds: (los - aos).num_milliseconds() as f64 / 1000.0,
                max_elevation_deg: max_el,
                max_elevation_time: max_el_time,
                start_azimuth_deg: aos_az,
                end_azimuth_deg: los_az,
            });
        }

        prev_visible = visible;
        cursor += coarse_step;
    }

    // Handle pass in progress at end of window
    if let Some((aos, aos_az)) = pass_start {
        if passes.len() < max_results {
            let sample = observe(prepared, observer, end)?;
            passes.push(RawPass {
                start: aos,
                duration_seconds: (end - aos).num_milliseconds() as f64 / 1000.0,
                max_elevation_deg: max_el,
                max_elevation_time: max_el_time,
                start_azimuth_deg: aos_az,
                end_azimuth_deg: sample.azimuth_deg,
            });
        }
    }

    Ok(passes)
}

/// Binary search for the threshold crossing time
fn refine_crossing(
    prepared: &Prepared,
    observer: &ObserverLocation,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    rising: bool,
    threshold: f64,
) -> Result<(DateTime<Utc>, f64), PropagationError> {
    let mut low = before;
    let mut high = after;

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let mid = low + (high - low) / 2;
        let above = observe(prepared, observer, mid)?.elevation_deg >= threshold;
        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }

    // Rising: first instant above. Setting: last instant above.
    let crossing = if rising { high } else { low };
    let sample = observe(prepared, observer, crossing)?;
    Ok((crossing, sample.azimuth_deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::fixtures;
    use chrono::TimeZone;

    fn scan(observer: &ObserverLocation, max_results: usize) -> Vec<RawPass> {
        let prepared = Prepared::new(&fixtures::iss()).unwrap();
        let start = Utc.with_ymd_and_hms(2008, 9, 20, 12, 0, 0).unwrap();
        find_passes(
            &prepared,
            observer,
            start,
            start + Duration::days(2),
            10.0,
            max_results,
        )
        .unwrap()
    }

    #[test]
    fn passes_are_ordered_and_above_threshold() {
        let observer = ObserverLocation::new(40.0, -75.0, 0.0).unwrap();
        let passes = scan(&observer, 20);
        assert!(!passes.is_empty());
        for pair in passes.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
        for pass in &passes {
            assert!(pass.duration_seconds > 0.0);
            assert!(pass.duration_seconds < 15.0 * 60.0);
            assert!(pass.max_elevation_deg >= 10.0);
            assert!(pass.max_elevation_time >= pass.start);
            assert!((0.0..360.0).contains(&pass.start_azimuth_deg));
        }
    }

    #[test]
    fn respects_max_results() {
        let observer = ObserverLocation::new(40.0, -75.0, 0.0).unwrap();
        assert!(scan(&observer, 1).len() <= 1);
    }

    #[test]
    fn high_latitude_observer_never_sees_the_station() {
        let observer = ObserverLocation::new(89.0, 0.0, 0.0).unwrap();
        assert!(scan(&observer, 20).is_empty());
    }
}
