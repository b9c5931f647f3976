use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::{SatelliteCategory, SatelliteEntry};
use crate::predict::PredictError;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteView {
    pub norad_id: String,
    pub name: String,
    pub category: SatelliteCategory,
    pub scale: f64,
    pub model_file: String,
}

impl From<&SatelliteEntry> for SatelliteView {
    fn from(entry: &SatelliteEntry) -> Self {
        Self {
            norad_id: entry.norad_id.clone(),
            name: entry.name.clone(),
            category: entry.category,
            scale: entry.scale,
            model_file: entry.model_file().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteListResponse {
    pub selected: SatelliteView,
    pub satellites: Vec<SatelliteView>,
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    responses(
        (status = 200, description = "Selectable satellites", body = SatelliteListResponse)
    ),
    tag = "satellites"
)]
pub async fn list(State(state): State<AppState>) -> Json<SatelliteListResponse> {
    Json(SatelliteListResponse {
        selected: SatelliteView::from(&state.session.satellite()),
        satellites: state.catalog.entries().iter().map(SatelliteView::from).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/api/satellites/{norad_id}/select",
    params(
        ("norad_id" = String, Path, description = "Catalog number of the satellite")
    ),
    responses(
        (status = 200, description = "Now tracking", body = SatelliteView),
        (status = 404, description = "Not in the catalog", body = ErrorResponse),
        (status = 502, description = "Orbital data unavailable", body = ErrorResponse)
    ),
    tag = "satellites"
)]
pub async fn select(
    State(state): State<AppState>,
    Path(norad_id): Path<String>,
) -> ApiResult<Json<SatelliteView>> {
    let entry = state
        .catalog
        .find(&norad_id)
        .cloned()
        .ok_or(PredictError::UnknownSatellite(norad_id))?;

    state.session.select_satellite(entry.clone()).await?;
    Ok(Json(SatelliteView::from(&entry)))
}
