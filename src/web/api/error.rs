use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::geolocation::GeolocationError;
use crate::predict::PredictError;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Upstream(String),
    Unavailable(String),
    Internal(String),
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        let message = e.to_string();
        match e {
            PredictError::Validation(msg) => ApiError::Validation(msg),
            PredictError::Fetch(_) => ApiError::Upstream(message),
            PredictError::Prediction(_) => ApiError::Internal(message),
            PredictError::Busy => ApiError::Conflict("prediction_in_progress", message),
            PredictError::Superseded { .. } => ApiError::Conflict("satellite_changed", message),
            PredictError::NoSuchPass(_) => ApiError::NotFound("pass_not_found", message),
            PredictError::UnknownSatellite(_) => {
                ApiError::NotFound("satellite_not_found", message)
            }
        }
    }
}

impl From<GeolocationError> for ApiError {
    fn from(e: GeolocationError) -> Self {
        ApiError::Unavailable(e.to_string())
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_message("validation_failed", msg),
            ),
            ApiError::NotFound(reason, msg) => {
                (StatusCode::NOT_FOUND, ErrorResponse::with_message(reason, msg))
            }
            ApiError::Conflict(reason, msg) => {
                (StatusCode::CONFLICT, ErrorResponse::with_message(reason, msg))
            }
            ApiError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::with_message("orbital_data_unavailable", msg),
            ),
            ApiError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::with_message("location_unavailable", msg),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_message("prediction_failed", msg),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
