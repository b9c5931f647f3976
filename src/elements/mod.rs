mod error;
mod source;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use error::FetchError;
pub use source::{ElementSource, HttpElementSource};

/// A satellite's two-line element set as served by the orbital data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrbitalElementSet {
    pub line1: String,
    pub line2: String,
}

impl OrbitalElementSet {
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self {
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        let line1 = self.line1.trim();
        let line2 = self.line2.trim();
        if !line1.starts_with("1 ") || !line2.starts_with("2 ") {
            return Err(FetchError::Malformed(
                "expected element lines starting with '1 ' and '2 '".into(),
            ));
        }
        Ok(())
    }

    pub fn to_elements(&self) -> Result<sgp4::Elements, sgp4::TleError> {
        sgp4::Elements::from_tle(
            None,
            self.line1.trim().as_bytes(),
            self.line2.trim().as_bytes(),
        )
    }

    /// One revolution, derived from the mean motion on line 2.
    pub fn orbital_period(&self) -> Option<Duration> {
        let elements = self.to_elements().ok()?;
        if elements.mean_motion <= 0.0 {
            return None;
        }
        let seconds = 86_400.0 / elements.mean_motion;
        Some(Duration::milliseconds((seconds * 1000.0).round() as i64))
    }
}
