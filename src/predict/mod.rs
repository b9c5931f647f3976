pub mod elevation;
mod error;
mod fallback;
mod orchestrator;
mod primary;
mod segmenter;
mod types;

pub use error::PredictError;
pub use orchestrator::{FlyoverSession, SessionSettings};
pub use types::{
    format_local_time, DisplayPass, ObserverLocation, PassRecord, PredictionWindow,
    DEFAULT_OBSERVER_HEIGHT_KM,
};
