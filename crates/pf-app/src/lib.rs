//! Application service layer for panelflutter.
//!
//! Shared by the CLI and any other frontend: loads and validates analysis cases,
//! runs the stiffness -> modes -> regime -> sweep -> detection pipeline, and
//! assembles the serializable analysis report.

pub mod config;
pub mod error;
pub mod report;
pub mod service;

pub use config::{
    AnalysisCase, FlowDef, LATEST_VERSION, LaminaDef, MaterialDef, load_case, save_case,
    validate_case,
};
pub use error::{AppError, AppResult, ErrorKind};
pub use report::{
    AnalysisReport, DeckParameters, ENGINE_VERSION, ModeRow, compute_case_id, save_report,
};
pub use service::{
    ModesSummary, detect_external, flow_template, resolve_material, run_analysis, run_modes,
};
