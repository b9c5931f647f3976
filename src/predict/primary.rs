use crate::elements::OrbitalElementSet;
use crate::predict::types::{
    ObserverLocation, PassRecord, PredictionWindow, VISIBILITY_THRESHOLD_DEG,
};
use crate::propagator::{PropagationError, Propagator, RawPass};

pub const MAX_RESULTS: usize = 20;

/// Result of asking the propagator's own pass finder.
#[derive(Debug)]
pub enum PrimaryOutcome {
    Usable(Vec<PassRecord>),
    /// No pass finder, no passes, or passes that fail validation.
    Unusable,
    Failed(PropagationError),
}

pub fn predict_passes_primary<P>(
    propagator: &P,
    elements: &OrbitalElementSet,
    observer: &ObserverLocation,
    window: &PredictionWindow,
) -> PrimaryOutcome
where
    P: Propagator + ?Sized,
{
    let raw = match propagator.find_visible_passes(
        elements,
        window,
        observer,
        VISIBILITY_THRESHOLD_DEG,
        MAX_RESULTS,
    ) {
        Ok(Some(raw)) => raw,
        Ok(None) => return PrimaryOutcome::Unusable,
        Err(e) => return PrimaryOutcome::Failed(e),
    };

    if raw.is_empty() {
        return PrimaryOutcome::Unusable;
    }

    match raw.iter().map(to_record).collect::<Option<Vec<_>>>() {
        Some(records) => PrimaryOutcome::Usable(records),
        None => {
            log::debug!("Pass finder returned malformed passes, discarding");
            PrimaryOutcome::Unusable
        }
    }
}

fn to_record(raw: &RawPass) -> Option<PassRecord> {
    let finite = [
        raw.duration_seconds,
        raw.max_elevation_deg,
        raw.start_azimuth_deg,
        raw.end_azimuth_deg,
    ]
    .iter()
    .all(|v| v.is_finite());

    if !finite || raw.duration_seconds <= 0.0 || raw.max_elevation_deg < VISIBILITY_THRESHOLD_DEG
    {
        return None;
    }

    Some(PassRecord {
        start: raw.start,
        max_elevation_time: raw.max_elevation_time,
        max_elevation_deg: raw.max_elevation_deg,
        duration_seconds: raw.duration_seconds,
        start_azimuth_deg: Some(raw.start_azimuth_deg),
        end_azimuth_deg: Some(raw.end_azimuth_deg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagator::GeoPoint;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    struct Finder(Result<Option<Vec<RawPass>>, PropagationError>);

    impl Propagator for Finder {
        fn sub_point(
            &self,
            _elements: &OrbitalElementSet,
            _time: DateTime<Utc>,
        ) -> Result<GeoPoint, PropagationError> {
            Ok(GeoPoint::new(0.0, 0.0))
        }

        fn find_visible_passes(
            &self,
            _elements: &OrbitalElementSet,
            _window: &PredictionWindow,
            _observer: &ObserverLocation,
            min_elevation_deg: f64,
            max_results: usize,
        ) -> Result<Option<Vec<RawPass>>, PropagationError> {
            assert_eq!(min_elevation_deg, 10.0);
            assert_eq!(max_results, 20);
            self.0.clone()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 21, 0, 0).unwrap()
    }

    fn raw(duration_seconds: f64, max_elevation_deg: f64) -> RawPass {
        RawPass {
            start: t0(),
            duration_seconds,
            max_elevation_deg,
            max_elevation_time: t0() + Duration::seconds(180),
            start_azimuth_deg: 301.2,
            end_azimuth_deg: 118.7,
        }
    }

    fn run(finder: Finder) -> PrimaryOutcome {
        let observer = ObserverLocation::new(52.0, 13.4, 0.04).unwrap();
        let window = PredictionWindow::from_days(t0(), 3).unwrap();
        predict_passes_primary(&finder, &OrbitalElementSet::new("1", "2"), &observer, &window)
    }

    #[test]
    fn maps_raw_passes_keeping_seconds() {
        match run(Finder(Ok(Some(vec![raw(412.0, 48.3)])))) {
            PrimaryOutcome::Usable(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].duration_seconds, 412.0);
                assert_eq!(records[0].start_azimuth_deg, Some(301.2));
                assert_eq!(records[0].end_azimuth_deg, Some(118.7));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn empty_or_missing_results_are_unusable() {
        assert!(matches!(run(Finder(Ok(Some(vec![])))), PrimaryOutcome::Unusable));
        assert!(matches!(run(Finder(Ok(None))), PrimaryOutcome::Unusable));
    }

    #[test]
    fn malformed_results_are_unusable() {
        let bad = vec![raw(300.0, 30.0), raw(f64::NAN, 30.0)];
        assert!(matches!(run(Finder(Ok(Some(bad)))), PrimaryOutcome::Unusable));
        let negative = vec![raw(-5.0, 30.0)];
        assert!(matches!(run(Finder(Ok(Some(negative)))), PrimaryOutcome::Unusable));
    }

    #[test]
    fn finder_errors_are_reported_as_failures() {
        let err = PropagationError::InvalidElements("checksum".into());
        assert!(matches!(run(Finder(Err(err))), PrimaryOutcome::Failed(_)));
    }
}
