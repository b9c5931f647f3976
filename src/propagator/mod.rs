mod frames;
mod pass_finder;
mod sgp4_backend;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::elements::OrbitalElementSet;
use crate::predict::{ObserverLocation, PredictionWindow};

pub use sgp4_backend::Sgp4Propagator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl GeoPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}

/// A pass as reported by a propagator's own pass finder, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPass {
    pub start: DateTime<Utc>,
    pub duration_seconds: f64,
    pub max_elevation_deg: f64,
    pub max_elevation_time: DateTime<Utc>,
    pub start_azimuth_deg: f64,
    pub end_azimuth_deg: f64,
}

#[derive(Debug, Clone, Error)]
pub enum PropagationError {
    #[error("invalid orbital elements: {0}")]
    InvalidElements(String),
    #[error("propagation failed at {time}: {message}")]
    Sample {
        time: DateTime<Utc>,
        message: String,
    },
}

impl PropagationError {
    /// Errors tied to a single instant; a scan may skip them and carry on.
    pub fn is_sample_error(&self) -> bool {
        matches!(self, PropagationError::Sample { .. })
    }
}

/// Orbital math consumed as a black box.
pub trait Propagator: Send + Sync {
    /// Geographic point directly beneath the satellite at `time`.
    fn sub_point(
        &self,
        elements: &OrbitalElementSet,
        time: DateTime<Utc>,
    ) -> Result<GeoPoint, PropagationError>;

    /// Built-in visible pass search. `Ok(None)` means the propagator has no
    /// pass finder of its own.
    fn find_visible_passes(
        &self,
        _elements: &OrbitalElementSet,
        _window: &PredictionWindow,
        _observer: &ObserverLocation,
        _min_elevation_deg: f64,
        _max_results: usize,
    ) -> Result<Option<Vec<RawPass>>, PropagationError> {
        Ok(None)
    }
}
