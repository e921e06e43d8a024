//! Analysis report and content-based case hashing.

use std::path::Path;

use pf_aero::{FlowState, PistonParameters, RegimeDecision};
use pf_core::{Frequency, Provenance, Sweep};
use pf_flutter::FlutterReport;
use pf_structures::{EquivalentStiffness, Material, ModeRecord, PanelGeometry};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AnalysisCase;
use crate::error::{AppError, AppResult};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hash of the case content and engine version. Identical cases analysed by the
/// same engine share an id.
pub fn compute_case_id(case: &AnalysisCase) -> String {
    let mut hasher = Sha256::new();

    let case_json = serde_json::to_string(case).unwrap_or_default();
    hasher.update(case_json.as_bytes());

    hasher.update(ENGINE_VERSION.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

/// One row of the mode table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeRow {
    pub m: usize,
    pub n: usize,
    pub frequency: Frequency,
    /// kg
    pub generalized_mass: f64,
}

impl From<&ModeRecord> for ModeRow {
    fn from(mode: &ModeRecord) -> Self {
        Self {
            m: mode.m,
            n: mode.n,
            frequency: mode.frequency,
            generalized_mass: mode.generalized_mass,
        }
    }
}

/// What an external solver deck needs: the structure that was analysed and the
/// free stream at the start of the sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckParameters {
    pub material: Material,
    pub geometry: PanelGeometry,
    pub stiffness: EquivalentStiffness,
    pub modes: Vec<ModeRow>,
    pub flow: FlowState,
}

/// Everything one analysis produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub case_id: String,
    pub name: String,
    /// RFC 3339
    pub generated_at: String,
    pub engine_version: String,
    pub regime: RegimeDecision,
    pub deck: DeckParameters,
    /// Piston parameters at the critical velocity, or at the range end when
    /// nothing fluttered. Supersonic cases only.
    pub piston: Option<PistonParameters>,
    pub sweep: Sweep,
    pub flutter: FlutterReport,
    pub provenance: Provenance,
    pub terminated_early: bool,
    pub refined_points: usize,
}

impl AnalysisReport {
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn save_report(path: &Path, report: &AnalysisReport) -> AppResult<()> {
    let content = report.to_json()?;
    std::fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
