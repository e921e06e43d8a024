//! Error types for structural analysis.

use pf_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuresError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type StructuresResult<T> = Result<T, StructuresError>;
