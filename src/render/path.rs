use chrono::{DateTime, Duration, Utc};

use crate::elements::OrbitalElementSet;
use crate::predict::elevation::EARTH_RADIUS_KM;
use crate::predict::{format_local_time, ObserverLocation, PassRecord};
use crate::propagator::{GeoPoint, Propagator};
use crate::render::{DirectionIndicator, FlyoverScene, Marker, ObserverMarker, TrajectorySample};

const PATH_MARGIN: Duration = Duration::minutes(30);
const PATH_SAMPLES: i32 = 120;
const DIRECTION_INDICATORS: usize = 5;
const MIN_POINTS_FOR_INDICATORS: usize = 10;
const VIEWING_RADIUS_KM: f64 = 500.0;
const VIEWING_CIRCLE_POINTS: usize = 72;

/// Initial great-circle bearing from the first point to the second, in [0, 360).
pub fn heading_deg(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let (lat1, lat2) = (from.lat_rad(), to.lat_rad());
    let d_lon = to.lon_rad() - from.lon_rad();
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Point reached by travelling `distance_km` along `bearing_deg` from `origin`.
fn destination(origin: &GeoPoint, bearing_deg: f64, distance_km: f64) -> GeoPoint {
    let delta = distance_km / EARTH_RADIUS_KM;
    let bearing = bearing_deg.to_radians();
    let (lat1, lon1) = (origin.lat_rad(), origin.lon_rad());

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(
        lat2.to_degrees(),
        (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0,
    )
}

/// Closed ring of points roughly at the observer's visibility horizon.
pub fn viewing_circle(center: &GeoPoint) -> Vec<GeoPoint> {
    let mut ring: Vec<GeoPoint> = (0..VIEWING_CIRCLE_POINTS)
        .map(|i| {
            let bearing = i as f64 * 360.0 / VIEWING_CIRCLE_POINTS as f64;
            destination(center, bearing, VIEWING_RADIUS_KM)
        })
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

fn sample_trajectory<P>(
    propagator: &P,
    elements: &OrbitalElementSet,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<TrajectorySample>
where
    P: Propagator + ?Sized,
{
    let span = end - start;
    (0..PATH_SAMPLES)
        .filter_map(|i| {
            let time = start + span * i / (PATH_SAMPLES - 1);
            match propagator.sub_point(elements, time) {
                Ok(position) => Some(TrajectorySample { time, position }),
                Err(e) => {
                    log::debug!("Skipping flyover path sample: {}", e);
                    None
                }
            }
        })
        .collect()
}

fn direction_indicators(trajectory: &[TrajectorySample]) -> Vec<DirectionIndicator> {
    if trajectory.len() < MIN_POINTS_FOR_INDICATORS {
        return Vec::new();
    }

    let interval = trajectory.len() / (DIRECTION_INDICATORS + 1);
    (1..=DIRECTION_INDICATORS)
        .map(|i| i * interval)
        .filter(|&idx| idx < trajectory.len() - 1)
        .map(|idx| {
            let current = &trajectory[idx].position;
            let next = &trajectory[idx + 1].position;
            DirectionIndicator {
                position: *current,
                heading_deg: heading_deg(current, next),
            }
        })
        .collect()
}

fn marker_at<P>(
    propagator: &P,
    elements: &OrbitalElementSet,
    time: DateTime<Utc>,
    altitude_km: f64,
    label: String,
) -> Option<Marker>
where
    P: Propagator + ?Sized,
{
    match propagator.sub_point(elements, time) {
        Ok(position) => Some(Marker {
            position,
            altitude_km,
            label,
        }),
        Err(e) => {
            log::warn!("Could not place marker '{}': {}", label, e);
            None
        }
    }
}

/// Geometry for a selected pass: the extended trajectory, direction
/// indicators, visible-window boundary markers and the observer marker.
pub fn build_flyover_scene<P>(
    propagator: &P,
    elements: &OrbitalElementSet,
    satellite_name: &str,
    pass: &PassRecord,
    observer: Option<&ObserverLocation>,
    altitude_km: f64,
) -> FlyoverScene
where
    P: Propagator + ?Sized,
{
    let start = pass.start;
    let end = pass.end();

    let trajectory = sample_trajectory(propagator, elements, start - PATH_MARGIN, end + PATH_MARGIN);
    let direction_indicators = direction_indicators(&trajectory);

    let visible_start = marker_at(
        propagator,
        elements,
        start,
        altitude_km,
        format!("Visible from: {}", format_local_time(start)),
    );
    let visible_end = marker_at(
        propagator,
        elements,
        end,
        altitude_km,
        format!("Visible until: {}", format_local_time(end)),
    );
    let satellite_marker = marker_at(
        propagator,
        elements,
        start,
        altitude_km,
        format!("{} at {}", satellite_name, format_local_time(start)),
    );

    let observer = observer.map(|o| {
        let center = GeoPoint::new(o.latitude_deg, o.longitude_deg);
        ObserverMarker {
            marker: Marker {
                position: center,
                altitude_km: 0.0,
                label: "Your Location".to_string(),
            },
            viewing_circle: viewing_circle(&center),
        }
    });

    FlyoverScene {
        trajectory,
        altitude_km,
        direction_indicators,
        visible_start,
        visible_end,
        satellite_marker,
        observer,
    }
}
