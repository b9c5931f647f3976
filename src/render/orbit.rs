use chrono::{DateTime, Duration, Utc};

use crate::elements::OrbitalElementSet;
use crate::propagator::{GeoPoint, Propagator};

const TRACK_STEP: Duration = Duration::seconds(60);

/// Ground track covering the previous, current and next revolution around
/// `now`, sampled once a minute. Unresolvable instants are left out.
pub fn ground_track<P>(
    propagator: &P,
    elements: &OrbitalElementSet,
    now: DateTime<Utc>,
    period: Duration,
) -> Vec<GeoPoint>
where
    P: Propagator + ?Sized,
{
    let start = now - period;
    let end = now + period * 2;

    let mut track = Vec::new();
    let mut t = start;
    while t <= end {
        match propagator.sub_point(elements, t) {
            Ok(point) => track.push(point),
            Err(e) => log::debug!("Orbit track gap at {}: {}", t, e),
        }
        t += TRACK_STEP;
    }
    track
}
