use chrono::{DateTime, Duration, Local, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::error::PredictError;

/// Minimum elevation (degrees) for a satellite to count as visible.
pub const VISIBILITY_THRESHOLD_DEG: f64 = 10.0;

/// Assumed observer height above sea level when none is supplied.
pub const DEFAULT_OBSERVER_HEIGHT_KM: f64 = 0.370;

/// Longest look-ahead accepted for a prediction.
pub const MAX_PREDICTION_DAYS: u32 = 30;

/// Where the observer stands. Call [`ObserverLocation::validate`] before
/// using a location that was not built through `new` or `parse`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ObserverLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub height_km: f64,
}

impl ObserverLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, height_km: f64) -> Result<Self, PredictError> {
        let location = Self {
            latitude_deg,
            longitude_deg,
            height_km,
        };
        location.validate()?;
        Ok(location)
    }

    /// Parse free-form user input, rejecting anything non-numeric.
    pub fn parse(latitude: &str, longitude: &str, height_km: Option<f64>) -> Result<Self, PredictError> {
        let invalid =
            || PredictError::Validation("Please enter valid latitude and longitude values.".into());
        let lat: f64 = latitude.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = longitude.trim().parse().map_err(|_| invalid())?;
        Self::new(lat, lon, height_km.unwrap_or(DEFAULT_OBSERVER_HEIGHT_KM))
    }

    pub fn validate(&self) -> Result<(), PredictError> {
        if !self.latitude_deg.is_finite() || !self.longitude_deg.is_finite() {
            return Err(PredictError::Validation(
                "Please enter valid latitude and longitude values.".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(PredictError::Validation(
                "Latitude must be between -90 and 90 degrees.".into(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude_deg) {
            return Err(PredictError::Validation(
                "Longitude must be between -180 and 180 degrees.".into(),
            ));
        }
        if !self.height_km.is_finite() {
            return Err(PredictError::Validation(
                "Observer height must be a finite number.".into(),
            ));
        }
        Ok(())
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PredictionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PredictionWindow {
    pub fn from_days(start: DateTime<Utc>, days: u32) -> Result<Self, PredictError> {
        if days == 0 {
            return Err(PredictError::Validation(
                "Number of days must be at least 1.".into(),
            ));
        }
        if days > MAX_PREDICTION_DAYS {
            return Err(PredictError::Validation(format!(
                "Number of days must be at most {}.",
                MAX_PREDICTION_DAYS
            )));
        }
        let end = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                PredictError::Validation("Prediction window ends past the supported date range.".into())
            })?;
        Ok(Self { start, end })
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// A single predicted visibility interval.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PassRecord {
    pub start: DateTime<Utc>,
    pub max_elevation_time: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub duration_seconds: f64,
    pub start_azimuth_deg: Option<f64>,
    pub end_azimuth_deg: Option<f64>,
}

impl PassRecord {
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::milliseconds((self.duration_seconds * 1000.0).round() as i64)
    }
}

/// A pass formatted for the pass list, keeping the raw record for path rendering.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DisplayPass {
    pub start_local: String,
    pub start_timestamp: DateTime<Utc>,
    pub duration_minutes: f64,
    pub max_elevation_deg: i64,
    pub start_azimuth_deg: i64,
    pub end_azimuth_deg: i64,
    pub pass: PassRecord,
}

impl From<PassRecord> for DisplayPass {
    fn from(pass: PassRecord) -> Self {
        DisplayPass {
            start_local: format_local(pass.start),
            start_timestamp: pass.start,
            duration_minutes: round1(pass.duration_seconds / 60.0),
            max_elevation_deg: pass.max_elevation_deg.round() as i64,
            start_azimuth_deg: pass.start_azimuth_deg.unwrap_or(0.0).round() as i64,
            end_azimuth_deg: pass.end_azimuth_deg.unwrap_or(0.0).round() as i64,
            pass,
        }
    }
}

pub fn format_local(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn format_local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(90.0, 0.0)]
    #[case(-90.0, 0.0)]
    #[case(0.0, -180.0)]
    #[case(0.0, 180.0)]
    #[case(51.5, -0.12)]
    fn accepts_coordinates_on_and_inside_bounds(#[case] lat: f64, #[case] lon: f64) {
        assert!(ObserverLocation::new(lat, lon, 0.0).is_ok());
    }

    #[rstest]
    #[case(90.0001, 0.0)]
    #[case(-90.0001, 0.0)]
    #[case(0.0, 180.0001)]
    #[case(0.0, -180.5)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_coordinates_out_of_bounds(#[case] lat: f64, #[case] lon: f64) {
        assert!(matches!(
            ObserverLocation::new(lat, lon, 0.0),
            Err(PredictError::Validation(_))
        ));
    }

    #[test]
    fn parse_rejects_non_numeric_input() {
        let err = ObserverLocation::parse("north", "12.0", None).unwrap_err();
        assert!(matches!(err, PredictError::Validation(_)));

        let ok = ObserverLocation::parse(" 48.85 ", "2.35", None).unwrap();
        assert_eq!(ok.latitude_deg, 48.85);
        assert_eq!(ok.height_km, DEFAULT_OBSERVER_HEIGHT_KM);
    }

    #[test]
    fn window_spans_whole_days() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let window = PredictionWindow::from_days(start, 3).unwrap();
        assert_eq!(window.length().num_seconds(), 3 * 86_400);
        assert!(PredictionWindow::from_days(start, 0).is_err());
    }

    #[rstest]
    #[case(MAX_PREDICTION_DAYS + 1)]
    #[case(u32::MAX)]
    fn rejects_window_longer_than_the_cap(#[case] days: u32) {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(matches!(
            PredictionWindow::from_days(start, days),
            Err(PredictError::Validation(_))
        ));
        assert!(PredictionWindow::from_days(start, MAX_PREDICTION_DAYS).is_ok());
    }

    #[test]
    fn rejects_window_ending_past_the_last_representable_instant() {
        let start = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        assert!(matches!(
            PredictionWindow::from_days(start, 1),
            Err(PredictError::Validation(_))
        ));
    }

    #[test]
    fn display_pass_rounds_fields() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let pass = PassRecord {
            start,
            max_elevation_time: start + Duration::seconds(200),
            max_elevation_deg: 45.6,
            duration_seconds: 394.0,
            start_azimuth_deg: Some(312.49),
            end_azimuth_deg: None,
        };
        let display = DisplayPass::from(pass.clone());
        assert_eq!(display.duration_minutes, 6.6);
        assert_eq!(display.max_elevation_deg, 46);
        assert_eq!(display.start_azimuth_deg, 312);
        assert_eq!(display.end_azimuth_deg, 0);
        assert_eq!(display.start_timestamp, start);
        assert_eq!(display.pass, pass);
        assert_eq!(pass.end(), start + Duration::seconds(394));
    }
}
