mod error;
mod tracker;

pub use error::TrackerError;
pub use tracker::{LiveTracker, TrackedPosition, DEFAULT_TRACK_INTERVAL};
