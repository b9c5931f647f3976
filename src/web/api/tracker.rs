use axum::{extract::State, Json};

use crate::propagator::GeoPoint;
use crate::render::Scene;
use crate::tracker::TrackedPosition;
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/tracker/position",
    responses(
        (status = 200, description = "Latest live position", body = Option<TrackedPosition>)
    ),
    tag = "tracker"
)]
pub async fn position(State(state): State<AppState>) -> Json<Option<TrackedPosition>> {
    Json(state.scene.snapshot().position)
}

#[utoipa::path(
    get,
    path = "/api/orbit",
    responses(
        (status = 200, description = "Ground track of the previous, current and next revolution", body = Vec<GeoPoint>)
    ),
    tag = "tracker"
)]
pub async fn orbit(State(state): State<AppState>) -> Json<Vec<GeoPoint>> {
    Json(state.session.orbit())
}

#[utoipa::path(
    get,
    path = "/api/scene",
    responses(
        (status = 200, description = "Everything currently drawn", body = Scene)
    ),
    tag = "tracker"
)]
pub async fn scene(State(state): State<AppState>) -> Json<Scene> {
    Json(state.scene.snapshot())
}
