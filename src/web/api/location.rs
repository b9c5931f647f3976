use axum::{extract::State, Json};

use crate::geolocation::use_current_location;
use crate::predict::ObserverLocation;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/location",
    responses(
        (status = 200, description = "Observer location", body = ObserverLocation),
        (status = 503, description = "Location unavailable", body = ErrorResponse)
    ),
    tag = "location"
)]
pub async fn current(State(state): State<AppState>) -> ApiResult<Json<ObserverLocation>> {
    let location = use_current_location(state.geolocation.as_ref()).await?;
    Ok(Json(location))
}
