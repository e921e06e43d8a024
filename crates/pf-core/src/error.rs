use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Malformed or non-physical input. Raised at the boundary where the input enters
/// the pipeline and never downgraded to a default.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("{what} = {value} outside [{min}, {max})")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{what} must not be empty")]
    Empty { what: &'static str },

    #[error("Inconsistent input: {what}")]
    Inconsistent { what: String },
}
