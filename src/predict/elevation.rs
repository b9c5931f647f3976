/// Mean Earth radius used by the spherical model.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Altitude assumed for low-Earth-orbit satellites.
pub const LEO_ALTITUDE_KM: f64 = 400.0;

/// Great-circle central angle between two points (radians in, radians out).
pub fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let cos_gamma = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos();
    // Rounding can push the argument just past +/-1.
    cos_gamma.clamp(-1.0, 1.0).acos()
}

/// Elevation angle in degrees at which an observer sees a satellite whose
/// sub-point is given, assuming a spherical Earth and a fixed altitude.
pub fn elevation_deg(
    observer_lat: f64,
    observer_lon: f64,
    satellite_lat: f64,
    satellite_lon: f64,
    altitude_km: f64,
) -> f64 {
    let gamma = central_angle(observer_lat, observer_lon, satellite_lat, satellite_lon);
    (gamma.cos() * EARTH_RADIUS_KM + altitude_km - EARTH_RADIUS_KM)
        .atan2(gamma.sin() * EARTH_RADIUS_KM)
        .to_degrees()
}
