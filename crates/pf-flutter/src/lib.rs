//! pf-flutter: flutter onset detection over velocity sweeps.
//!
//! The detector runs on [`pf_core::Sweep`] regardless of whether the sweep came
//! from the internal engine or from imported external solver records.

pub mod detector;
pub mod error;
pub mod external;

pub use detector::{
    DAMPING_NOISE_THRESHOLD, DetectorConfig, Diagnostic, FlutterOnset, FlutterReport,
    FlutterResult, detect, stop_on_flutter,
};
pub use error::{DetectError, DetectResult};
pub use external::{ExternalRecord, import_records, parse_records};
