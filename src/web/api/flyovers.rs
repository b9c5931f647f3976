use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::predict::{DisplayPass, ObserverLocation, DEFAULT_OBSERVER_HEIGHT_KM};
use crate::render::FlyoverScene;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FlyoverRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Defaults to the configured day count.
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub height_km: Option<f64>,
}

#[utoipa::path(
    post,
    path = "/api/flyovers",
    request_body = FlyoverRequest,
    responses(
        (status = 200, description = "Predicted passes", body = Vec<DisplayPass>),
        (status = 400, description = "Invalid observer or day count", body = ErrorResponse),
        (status = 409, description = "Prediction already running or satellite changed", body = ErrorResponse),
        (status = 502, description = "Orbital data unavailable", body = ErrorResponse)
    ),
    tag = "flyovers"
)]
pub async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<FlyoverRequest>,
) -> ApiResult<Json<Vec<DisplayPass>>> {
    let observer = ObserverLocation {
        latitude_deg: request.latitude,
        longitude_deg: request.longitude,
        height_km: request.height_km.unwrap_or(DEFAULT_OBSERVER_HEIGHT_KM),
    };
    let days = request
        .days
        .unwrap_or(state.config.prediction.default_days);

    let passes = state.session.predict_passes(observer, days).await?;
    Ok(Json(passes))
}

#[utoipa::path(
    get,
    path = "/api/flyovers",
    responses(
        (status = 200, description = "Current pass list", body = Vec<DisplayPass>)
    ),
    tag = "flyovers"
)]
pub async fn list(State(state): State<AppState>) -> Json<Vec<DisplayPass>> {
    Json(state.session.passes())
}

#[utoipa::path(
    post,
    path = "/api/flyovers/{index}/select",
    params(
        ("index" = usize, Path, description = "Position in the current pass list")
    ),
    responses(
        (status = 200, description = "Flyover path and markers", body = FlyoverScene),
        (status = 400, description = "No orbital data yet", body = ErrorResponse),
        (status = 404, description = "No such pass", body = ErrorResponse)
    ),
    tag = "flyovers"
)]
pub async fn select(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<FlyoverScene>> {
    let scene = state.session.select_flyover(index).await?;
    Ok(Json(scene))
}

#[utoipa::path(
    post,
    path = "/api/flyovers/reset",
    responses(
        (status = 204, description = "Flyover path and markers cleared")
    ),
    tag = "flyovers"
)]
pub async fn reset(State(state): State<AppState>) -> StatusCode {
    state.session.reset_view();
    StatusCode::NO_CONTENT
}
