//! Error types for aerodynamic coupling.

use pf_core::ValidationError;
use pf_structures::StructuresError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AeroError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "Unsupported regime: Mach {mach} lies in the excluded transonic band [{lower}, {upper})"
    )]
    UnsupportedRegime { mach: f64, lower: f64, upper: f64 },

    #[error("Unsupported theory: {what}")]
    UnsupportedTheory { what: String },

    #[error("Structures error: {0}")]
    Structures(#[from] StructuresError),
}

pub type AeroResult<T> = Result<T, AeroError>;
