use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};
use std::sync::{Arc, Mutex as StdMutex};

use crate::elements::OrbitalElementSet;
use crate::predict::{ObserverLocation, PredictionWindow};
use crate::propagator::frames::{ecef_to_geodetic, teme_to_ecef_position};
use crate::propagator::pass_finder::find_passes;
use crate::propagator::{GeoPoint, PropagationError, Propagator, RawPass};

/// SGP4 propagation through the `sgp4` crate.
///
/// The most recently used element set is kept parsed, so a scan over one
/// satellite only builds its constants once.
#[derive(Default)]
pub struct Sgp4Propagator {
    last: StdMutex<Option<(OrbitalElementSet, Arc<Prepared>)>>,
}

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepared(&self, set: &OrbitalElementSet) -> Result<Arc<Prepared>, PropagationError> {
        let mut last = self.last.lock().unwrap();
        if let Some((cached, prepared)) = last.as_ref() {
            if cached == set {
                return Ok(prepared.clone());
            }
        }
        let prepared = Arc::new(Prepared::new(set)?);
        *last = Some((set.clone(), prepared.clone()));
        Ok(prepared)
    }
}

pub(crate) struct Prepared {
    pub elements: Elements,
    pub constants: Constants,
}

impl Prepared {
    pub fn new(set: &OrbitalElementSet) -> Result<Self, PropagationError> {
        let elements = set
            .to_elements()
            .map_err(|e| PropagationError::InvalidElements(e.to_string()))?;
        let constants = Constants::from_elements(&elements)
            .map_err(|e| PropagationError::InvalidElements(e.to_string()))?;
        Ok(Self {
            elements,
            constants,
        })
    }

    /// Earth-fixed position of the satellite in km.
    pub fn position_ecef(&self, timestamp: DateTime<Utc>) -> Result<[f64; 3], PropagationError> {
        let sample_err = |message: String| PropagationError::Sample {
            time: timestamp,
            message,
        };

        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| sample_err(e.to_string()))?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| sample_err(e.to_string()))?;

        let sidereal = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(
            &timestamp.naive_utc(),
        ));

        Ok(teme_to_ecef_position(prediction.position, sidereal))
    }

    pub fn sub_point(&self, timestamp: DateTime<Utc>) -> Result<GeoPoint, PropagationError> {
        let (lat, lon, _) = ecef_to_geodetic(self.position_ecef(timestamp)?);
        Ok(GeoPoint::new(lat, lon))
    }
}

impl Propagator for Sgp4Propagator {
    fn sub_point(
        &self,
        elements: &OrbitalElementSet,
        time: DateTime<Utc>,
    ) -> Result<GeoPoint, PropagationError> {
        self.prepared(elements)?.sub_point(time)
    }

    fn find_visible_passes(
        &self,
        elements: &OrbitalElementSet,
        window: &PredictionWindow,
        observer: &ObserverLocation,
        min_elevation_deg: f64,
        max_results: usize,
    ) -> Result<Option<Vec<RawPass>>, PropagationError> {
        let prepared = self.prepared(elements)?;
        let passes = find_passes(
            &prepared,
            observer,
            window.start,
            window.end,
            min_elevation_deg,
            max_results,
        )?;
        Ok(Some(passes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::fixtures;
    use chrono::{Duration, TimeZone};

    fn epoch() -> DateTime<Utc> {
        // 2008-09-20 12:25:40 UTC, the fixture's epoch.
        Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap()
    }

    #[test]
    fn sub_point_stays_within_inclination() {
        let set = fixtures::iss();
        let propagator = Sgp4Propagator::new();
        for minutes in (0..180).step_by(7) {
            let p = propagator
                .sub_point(&set, epoch() + Duration::minutes(minutes))
                .unwrap();
            assert!(p.latitude_deg.abs() <= 52.0, "lat {}", p.latitude_deg);
            assert!((-180.0..=180.0).contains(&p.longitude_deg));
        }
    }

    #[test]
    fn invalid_elements_are_not_sample_errors() {
        let set = OrbitalElementSet::new("1 garbage", "2 garbage");
        let err = Sgp4Propagator::new().sub_point(&set, epoch()).unwrap_err();
        assert!(!err.is_sample_error());
    }

    #[test]
    fn reuses_parsed_elements_until_the_set_changes() {
        let propagator = Sgp4Propagator::new();
        let iss = fixtures::iss();
        let first = propagator.prepared(&iss).unwrap();
        let again = propagator.prepared(&iss).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let other = OrbitalElementSet::new(
            fixtures::ISS_LINE1,
            format!("{} ", fixtures::ISS_LINE2),
        );
        let changed = propagator.prepared(&other).unwrap();
        assert!(!Arc::ptr_eq(&first, &changed));
        assert!(propagator
            .sub_point(&OrbitalElementSet::new("1 garbage", "2 garbage"), epoch())
            .is_err());
        let back = propagator.prepared(&iss).unwrap();
        assert!(!Arc::ptr_eq(&changed, &back));
    }

    #[test]
    fn altitude_is_low_earth_orbit() {
        let prepared = Prepared::new(&fixtures::iss()).unwrap();
        let (_, _, h) = ecef_to_geodetic(prepared.position_ecef(epoch()).unwrap());
        assert!((300.0..450.0).contains(&h), "height {h}");
    }
}
