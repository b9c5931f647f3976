use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::flyovers::FlyoverRequest;
use super::api::satellites::{SatelliteListResponse, SatelliteView};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::satellites::list,
        super::api::satellites::select,
        super::api::flyovers::calculate,
        super::api::flyovers::list,
        super::api::flyovers::select,
        super::api::flyovers::reset,
        super::api::tracker::position,
        super::api::tracker::orbit,
        super::api::tracker::scene,
        super::api::location::current,
    ),
    components(
        schemas(
            ErrorResponse,
            FlyoverRequest,
            SatelliteListResponse,
            SatelliteView,
            crate::catalog::SatelliteCategory,
            crate::predict::DisplayPass,
            crate::predict::PassRecord,
            crate::predict::ObserverLocation,
            crate::propagator::GeoPoint,
            crate::render::Scene,
            crate::render::FlyoverScene,
            crate::render::Marker,
            crate::render::ObserverMarker,
            crate::render::DirectionIndicator,
            crate::render::TrajectorySample,
            crate::tracker::TrackedPosition,
        )
    ),
    info(
        title = "Flyover Watch API",
        description = "Satellite tracking and visible pass prediction",
        version = "0.1.0"
    ),
    tags(
        (name = "satellites", description = "Satellite catalog and selection"),
        (name = "flyovers", description = "Visible pass prediction and flyover paths"),
        (name = "tracker", description = "Live position and orbit track"),
        (name = "location", description = "Observer location")
    )
)]
pub struct ApiDoc;
