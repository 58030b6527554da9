use crate::start_date::StartDateError;
use thiserror::Error;

/// Errors raised while setting up a run
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid start date option")]
    InvalidStartDate(#[from] StartDateError),

    #[error("Invalid stale options: {0}")]
    InvalidOptions(String),
}
