//! Error types for the velocity sweep.

use pf_aero::AeroError;
use pf_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Aerodynamic error: {0}")]
    Aero(#[from] AeroError),

    /// One velocity step failed to solve. Recorded as a gap, not propagated.
    #[error("Step at {velocity} m/s failed: {what}")]
    StepFailed { velocity: f64, what: String },

    #[error(
        "Convergence failed: {consecutive_gaps} consecutive velocity steps failed, last at {velocity} m/s"
    )]
    Convergence {
        velocity: f64,
        consecutive_gaps: usize,
    },
}

impl SweepError {
    /// True for failures that become gaps rather than aborting the sweep.
    pub fn is_step_failure(&self) -> bool {
        matches!(self, SweepError::StepFailed { .. })
    }
}

pub type SweepResult<T> = Result<T, SweepError>;
