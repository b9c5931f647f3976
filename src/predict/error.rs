use thiserror::Error;

use crate::elements::FetchError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("{0}")]
    Validation(String),
    #[error("orbital data unavailable: {0}")]
    Fetch(#[from] FetchError),
    #[error("pass prediction failed: {0}")]
    Prediction(String),
    #[error("a prediction is already in progress")]
    Busy,
    #[error("tracked satellite changed from {satellite} while the request was in flight")]
    Superseded { satellite: String },
    #[error("no pass at index {0}")]
    NoSuchPass(usize),
    #[error("unknown satellite: {0}")]
    UnknownSatellite(String),
}
