//! Analysis case files.
//!
//! A case names everything one flutter analysis needs: material, geometry, flow
//! template, Mach number, velocity plan and the options of every stage. Cases are
//! read from YAML or JSON, chosen by file extension, and validated before any
//! physics runs.

use std::path::Path;

use pf_aero::AeroOptions;
use pf_core::{Density, Length, ValidationError, Velocity, ensure_finite, ensure_positive};
use pf_flutter::DetectorConfig;
use pf_solver::{SweepOptions, SweepPlan};
use pf_structures::{Lamina, Laminate, Material, ModalOptions, PanelGeometry, Ply, catalog};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Newest case file version this build reads.
pub const LATEST_VERSION: u32 = 1;

fn latest_version() -> u32 {
    LATEST_VERSION
}

/// Ply material: a catalog name or an inline lamina.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LaminaDef {
    Catalog(String),
    Inline(Lamina),
}

impl LaminaDef {
    pub fn resolve(&self) -> AppResult<Lamina> {
        match self {
            LaminaDef::Catalog(name) => catalog::lamina(name).ok_or_else(|| {
                AppError::Config(format!(
                    "unknown catalog material '{name}', expected one of {}",
                    catalog::NAMES.join(", ")
                ))
            }),
            LaminaDef::Inline(lamina) => Ok(lamina.clone()),
        }
    }
}

/// Panel material as written in a case file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialDef {
    /// Homogeneous catalog material
    Catalog { catalog: String },
    /// Laminate of equal-thickness plies of one lamina, listed bottom first.
    /// With `symmetric`, the angles are the lower half and are mirrored.
    Stack {
        lamina: LaminaDef,
        ply_thickness: Length,
        angles: Vec<f64>,
        #[serde(default)]
        symmetric: bool,
    },
    Inline(Material),
}

impl MaterialDef {
    pub fn resolve(&self) -> AppResult<Material> {
        let material = match self {
            MaterialDef::Catalog { catalog: name } => {
                LaminaDef::Catalog(name.clone()).resolve().map(|lamina| match lamina {
                    Lamina::Isotropic(m) => Material::Isotropic(m),
                    Lamina::Orthotropic(m) => Material::Orthotropic(m),
                })?
            }
            MaterialDef::Stack {
                lamina,
                ply_thickness,
                angles,
                symmetric,
            } => {
                let lamina = lamina.resolve()?;
                let laminate = if *symmetric {
                    let half = angles
                        .iter()
                        .map(|&angle| Ply::new(lamina.clone(), *ply_thickness, angle))
                        .collect();
                    Laminate::symmetric(half)?
                } else {
                    Laminate::from_angles(lamina, *ply_thickness, angles)?
                };
                Material::Laminate(laminate)
            }
            MaterialDef::Inline(material) => material.clone(),
        };
        material.validate()?;
        Ok(material)
    }
}

/// Where free-stream density and speed of sound come from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowDef {
    /// ISA standard atmosphere at a geometric altitude
    Standard { altitude: Length },
    Explicit {
        density: Density,
        speed_of_sound: Velocity,
    },
}

/// One flutter analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisCase {
    #[serde(default = "latest_version")]
    pub version: u32,
    pub name: String,
    pub material: MaterialDef,
    pub geometry: PanelGeometry,
    pub flow: FlowDef,
    /// Held fixed over the sweep
    pub mach: f64,
    pub plan: SweepPlan,
    #[serde(default)]
    pub modal: ModalOptions,
    #[serde(default)]
    pub aero: AeroOptions,
    #[serde(default)]
    pub sweep: SweepOptions,
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Stop sweeping once the detector confirms an onset
    #[serde(default)]
    pub stop_at_first_onset: bool,
}

/// Check a case without running any analysis.
pub fn validate_case(case: &AnalysisCase) -> AppResult<()> {
    if case.version == 0 || case.version > LATEST_VERSION {
        return Err(AppError::Config(format!(
            "unsupported case version {}, this build reads up to {LATEST_VERSION}",
            case.version
        )));
    }
    if case.name.trim().is_empty() {
        return Err(AppError::Validation("case name must not be empty".to_string()));
    }

    case.material.resolve()?;
    case.geometry.validate()?;
    ensure_finite(case.mach, "Mach number")?;
    if case.mach < 0.0 {
        return Err(ValidationError::OutOfRange {
            what: "Mach number",
            value: case.mach,
            min: 0.0,
            max: f64::INFINITY,
        }
        .into());
    }
    if let FlowDef::Explicit {
        density,
        speed_of_sound,
    } = case.flow
    {
        ensure_positive(density.value, "free-stream density")?;
        ensure_positive(speed_of_sound.value, "speed of sound")?;
    }
    case.plan.validate()?;
    case.aero.regime.validate()?;
    if case.aero.chordwise_panels == 0 {
        return Err(AppError::Validation(
            "chordwise lattice needs at least one panel".to_string(),
        ));
    }
    if case.modal.mode_count == 0 {
        return Err(AppError::Validation("mode count must be at least 1".to_string()));
    }
    case.sweep.validate(case.modal.mode_count)?;
    case.detector.validate()?;

    debug!(name = %case.name, "Case validated");
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Load and validate a case. `.json` files are read as JSON, anything else as YAML.
pub fn load_case(path: &Path) -> AppResult<AnalysisCase> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let case: AnalysisCase = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    validate_case(&case)?;
    Ok(case)
}

/// Validate and save a case, in the format its extension names.
pub fn save_case(path: &Path, case: &AnalysisCase) -> AppResult<()> {
    validate_case(case)?;
    let content = if is_json(path) {
        serde_json::to_string_pretty(case)?
    } else {
        serde_yaml::to_string(case)?
    };

    std::fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const CASE: &str = r#"
name: aluminium reference panel
material: { catalog: aluminium_7075_t6 }
geometry:
  length: 0.5
  width: 0.4
  thickness: 0.003
flow: { kind: standard, altitude: 0.0 }
mach: 2.0
plan:
  range: { min: 100.0, max: 1600.0 }
  policy: { kind: fixed, step: 50.0 }
"#;

    fn case() -> AnalysisCase {
        serde_yaml::from_str(CASE).unwrap()
    }

    #[test]
    fn minimal_case_takes_defaults() {
        let case = case();
        assert_eq!(case.version, LATEST_VERSION);
        assert_eq!(case.modal, ModalOptions::default());
        assert_eq!(case.sweep, SweepOptions::default());
        assert_eq!(case.detector.threshold, pf_flutter::DAMPING_NOISE_THRESHOLD);
        assert!(!case.stop_at_first_onset);
        assert!(case.geometry.edges.is_simply_supported());
        validate_case(&case).unwrap();
    }

    #[test]
    fn material_forms_resolve() {
        let catalog = case().material.resolve().unwrap();
        assert_eq!(catalog.kind_name(), "isotropic");

        let stack: MaterialDef = serde_yaml::from_str(
            "{ lamina: t300_5208, ply_thickness: 0.000125, angles: [0, 45, -45, 90], symmetric: true }",
        )
        .unwrap();
        match stack.resolve().unwrap() {
            Material::Laminate(l) => {
                assert_eq!(l.plies().len(), 8);
                assert!(l.is_symmetric());
            }
            other => panic!("expected a laminate, got {}", other.kind_name()),
        }

        let inline: MaterialDef = serde_yaml::from_str(
            "{ kind: isotropic, youngs_modulus: 70.0e9, poisson_ratio: 0.3, density: 2700.0 }",
        )
        .unwrap();
        assert!(matches!(inline.resolve().unwrap(), Material::Isotropic(_)));
    }

    #[test]
    fn unknown_catalog_name_is_a_config_error() {
        let def = MaterialDef::Catalog {
            catalog: "unobtainium".to_string(),
        };
        let err = def.resolve().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("aluminium_7075_t6"));
    }

    #[test]
    fn rejects_bad_cases() {
        let mut future = case();
        future.version = LATEST_VERSION + 1;
        assert_eq!(validate_case(&future).unwrap_err().kind(), ErrorKind::Config);

        let mut thin = case();
        thin.geometry.thickness = Some(pf_core::mm(-1.0));
        assert_eq!(validate_case(&thin).unwrap_err().kind(), ErrorKind::Validation);

        let mut tracked = case();
        tracked.sweep.tracked_modes = Some(tracked.modal.mode_count + 1);
        assert_eq!(validate_case(&tracked).unwrap_err().kind(), ErrorKind::Validation);

        let mut empty = case();
        empty.material = MaterialDef::Stack {
            lamina: LaminaDef::Catalog("t300_5208".to_string()),
            ply_thickness: pf_core::mm(0.125),
            angles: vec![],
            symmetric: false,
        };
        assert_eq!(validate_case(&empty).unwrap_err().kind(), ErrorKind::Validation);
    }
}
