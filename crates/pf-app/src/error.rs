//! Error types for the pf-app service layer.

use std::path::PathBuf;

use pf_aero::AeroError;
use pf_core::ValidationError;
use pf_flutter::DetectError;
use pf_solver::SweepError;
use pf_structures::StructuresError;

/// Error taxonomy exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or non-physical input
    Validation,
    /// Mach number in the excluded band, or a theory that does not cover the flow
    UnsupportedRegime,
    /// Repeated eigen-solve failures aborted the sweep
    Convergence,
    Io,
    /// Unreadable or unparsable case or record file
    Config,
}

/// Application error type that wraps errors from the backend crates
/// and provides a unified error interface for every frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported regime: {0}")]
    UnsupportedRegime(String),

    #[error("Convergence failed: {0}")]
    Convergence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::UnsupportedRegime(_) => ErrorKind::UnsupportedRegime,
            AppError::Convergence(_) => ErrorKind::Convergence,
            AppError::Config(_) => ErrorKind::Config,
            AppError::FileRead { .. } | AppError::FileWrite { .. } | AppError::Io(_) => {
                ErrorKind::Io
            }
        }
    }
}

/// Result type for pf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<StructuresError> for AppError {
    fn from(err: StructuresError) -> Self {
        match err {
            StructuresError::Validation(e) => e.into(),
            StructuresError::Numeric { .. } => AppError::Convergence(err.to_string()),
        }
    }
}

impl From<AeroError> for AppError {
    fn from(err: AeroError) -> Self {
        match err {
            AeroError::Validation(e) => e.into(),
            AeroError::Structures(e) => e.into(),
            AeroError::UnsupportedRegime { .. } | AeroError::UnsupportedTheory { .. } => {
                AppError::UnsupportedRegime(err.to_string())
            }
        }
    }
}

impl From<SweepError> for AppError {
    fn from(err: SweepError) -> Self {
        match err {
            SweepError::Validation(e) => e.into(),
            SweepError::Aero(e) => e.into(),
            SweepError::StepFailed { .. } | SweepError::Convergence { .. } => {
                AppError::Convergence(err.to_string())
            }
        }
    }
}

impl From<DetectError> for AppError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::Validation(e) => e.into(),
            DetectError::Parse(_) => AppError::Config(err.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_keep_their_kind() {
        let v: AppError = ValidationError::Empty { what: "laminate" }.into();
        assert_eq!(v.kind(), ErrorKind::Validation);

        let nested: AppError =
            SweepError::Aero(AeroError::Validation(ValidationError::Empty { what: "modes" }))
                .into();
        assert_eq!(nested.kind(), ErrorKind::Validation);

        let regime: AppError = AeroError::UnsupportedRegime {
            mach: 1.1,
            lower: 1.0,
            upper: 1.2,
        }
        .into();
        assert_eq!(regime.kind(), ErrorKind::UnsupportedRegime);
        assert!(regime.to_string().contains("1.1"));

        let conv: AppError = SweepError::Convergence {
            velocity: 700.0,
            consecutive_gaps: 3,
        }
        .into();
        assert_eq!(conv.kind(), ErrorKind::Convergence);

        let numeric: AppError = StructuresError::Numeric {
            what: "singular edge matrix".to_string(),
        }
        .into();
        assert_eq!(numeric.kind(), ErrorKind::Convergence);
    }

    #[test]
    fn parse_errors_are_config_errors() {
        let err = serde_json::from_str::<Vec<f64>>("[1.0,").unwrap_err();
        let detect: AppError = DetectError::Parse(err).into();
        assert_eq!(detect.kind(), ErrorKind::Config);

        let yaml = serde_yaml::from_str::<Vec<f64>>("{ a").unwrap_err();
        assert_eq!(AppError::from(yaml).kind(), ErrorKind::Config);
    }
}
