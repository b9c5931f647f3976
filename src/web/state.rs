use std::sync::Arc;

use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::elements::{FetchError, HttpElementSource};
use crate::geolocation::ConfiguredLocation;
use crate::predict::{FlyoverSession, PredictError, SessionSettings};
use crate::propagator::{Propagator, Sgp4Propagator};
use crate::render::SceneStore;
use crate::web::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub scene: Arc<SceneStore>,
    pub session: Arc<FlyoverSession<HttpElementSource>>,
    pub geolocation: Arc<ConfiguredLocation>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, FetchError> {
        let source = HttpElementSource::new(&config.elements.base_url, config.elements.timeout)?;
        Ok(Self::new(
            config,
            source,
            Arc::new(Sgp4Propagator::new()),
            Arc::new(SystemClock),
        ))
    }

    pub fn new(
        config: Config,
        source: HttpElementSource,
        propagator: Arc<dyn Propagator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let catalog = config.catalog();
        let scene = Arc::new(SceneStore::new());
        // An invalid configured observer is rejected at load time.
        let geolocation = ConfiguredLocation::new(config.observer_location().ok().flatten());
        let satellite = catalog
            .default_satellite()
            .cloned()
            .unwrap_or_else(|| Catalog::default().entries()[0].clone());

        let session = FlyoverSession::new(
            source,
            propagator,
            clock,
            scene.clone(),
            satellite,
            SessionSettings {
                altitude_km: config.prediction.satellite_altitude_km,
                track_interval: config.prediction.track_interval,
            },
        );

        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            scene,
            session: Arc::new(session),
            geolocation: Arc::new(geolocation),
        }
    }

    /// Start tracking the session's satellite, as a satellite switch would.
    pub async fn track_default_satellite(&self) -> Result<(), PredictError> {
        self.session.select_satellite(self.session.satellite()).await
    }
}
