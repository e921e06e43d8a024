//! Error types for onset detection and record import.

use pf_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type DetectResult<T> = Result<T, DetectError>;
