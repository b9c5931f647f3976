use crate::predict::ObserverLocation;

// WGS-84
const WGS84_A_KM: f64 = 6378.137;
const WGS84_E2: f64 = 0.006_694_379_990_14;

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn geodetic_to_ecef(lat_rad: f64, lon_rad: f64, height_km: f64) -> [f64; 3] {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    [
        (n + height_km) * cos_lat * lon_rad.cos(),
        (n + height_km) * cos_lat * lon_rad.sin(),
        (n * (1.0 - WGS84_E2) + height_km) * sin_lat,
    ]
}

/// Geodetic latitude, longitude (degrees) and height (km) of an ECEF point.
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = ecef;
    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    for _ in 0..10 {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        lat = (z + WGS84_E2 * n * sin_lat).atan2(p);
    }

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let height = if cos_lat.abs() > 1e-10 {
        p / cos_lat - n
    } else {
        z.abs() / sin_lat.abs() - n * (1.0 - WGS84_E2)
    };

    (lat.to_degrees(), lon.to_degrees(), height)
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// Azimuth and elevation (degrees) of an ECEF position seen from the observer.
pub fn look_angles(observer: &ObserverLocation, sat_ecef: [f64; 3]) -> (f64, f64) {
    let sta = geodetic_to_ecef(observer.lat_rad(), observer.lon_rad(), observer.height_km);
    let dr = [
        sat_ecef[0] - sta[0],
        sat_ecef[1] - sta[1],
        sat_ecef[2] - sta[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
    let azimuth = east.atan2(north).to_degrees().rem_euclid(360.0);
    let elevation = if range_km > 0.0 {
        (up / range_km).asin().to_degrees()
    } else {
        90.0
    };
    (azimuth, elevation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geodetic_round_trip_is_stable() {
        let ecef = geodetic_to_ecef(48.0_f64.to_radians(), 11.5_f64.to_radians(), 420.0);
        let (lat, lon, h) = ecef_to_geodetic(ecef);
        assert!((lat - 48.0).abs() < 1e-6);
        assert!((lon - 11.5).abs() < 1e-9);
        assert!((h - 420.0).abs() < 1e-3);
    }

    #[test]
    fn point_above_observer_is_at_zenith() {
        let observer = ObserverLocation::new(-33.9, 18.4, 0.0).unwrap();
        let above = geodetic_to_ecef(observer.lat_rad(), observer.lon_rad(), 400.0);
        let (_, el) = look_angles(&observer, above);
        assert!((el - 90.0).abs() < 1e-6);
    }

    #[test]
    fn point_due_east_has_azimuth_ninety() {
        let observer = ObserverLocation::new(0.0, 0.0, 0.0).unwrap();
        let east = geodetic_to_ecef(0.0, 5.0_f64.to_radians(), 400.0);
        let (az, el) = look_angles(&observer, east);
        assert!((az - 90.0).abs() < 1e-6);
        assert!(el > 0.0);
    }
}
