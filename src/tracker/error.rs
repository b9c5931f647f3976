use thiserror::Error;

use crate::propagator::PropagationError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("cannot track satellite: {0}")]
    Propagation(#[from] PropagationError),
}
