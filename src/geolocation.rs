//! Where is the observer? Answered once, with a deadline.

use std::future::Future;
use std::time::Duration as StdDuration;

use thiserror::Error;

use crate::predict::{ObserverLocation, DEFAULT_OBSERVER_HEIGHT_KM};

pub const GEOLOCATION_TIMEOUT: StdDuration = StdDuration::from_secs(5);

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("Couldn't get your location. Please enter it manually.")]
    Unavailable(String),
    #[error("location request timed out")]
    Timeout,
}

/// Single-shot position lookup. Implementations must not return cached fixes.
pub trait GeolocationProvider: Send + Sync {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<(f64, f64), GeolocationError>> + Send;
}

/// Answers with the location configured for this deployment.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    location: Option<ObserverLocation>,
}

impl ConfiguredLocation {
    pub fn new(location: Option<ObserverLocation>) -> Self {
        Self { location }
    }
}

impl GeolocationProvider for ConfiguredLocation {
    async fn current_position(&self) -> Result<(f64, f64), GeolocationError> {
        self.location
            .map(|l| (l.latitude_deg, l.longitude_deg))
            .ok_or_else(|| GeolocationError::Unavailable("no observer location configured".into()))
    }
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// Ask the provider for the observer's position, giving up after `timeout`.
pub async fn locate_with_timeout<G>(
    provider: &G,
    timeout: StdDuration,
) -> Result<ObserverLocation, GeolocationError>
where
    G: GeolocationProvider,
{
    let (lat, lon) = tokio::time::timeout(timeout, provider.current_position())
        .await
        .map_err(|_| GeolocationError::Timeout)??;

    ObserverLocation::new(round6(lat), round6(lon), DEFAULT_OBSERVER_HEIGHT_KM)
        .map_err(|e| GeolocationError::Unavailable(e.to_string()))
}

pub async fn use_current_location<G>(provider: &G) -> Result<ObserverLocation, GeolocationError>
where
    G: GeolocationProvider,
{
    let result = locate_with_timeout(provider, GEOLOCATION_TIMEOUT).await;
    if let Err(e) = &result {
        log::error!("Error getting location: {}", e);
    }
    result
}
