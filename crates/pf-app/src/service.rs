//! Analysis pipeline orchestration.

use pf_aero::{FlowState, build_theory, piston_parameters, select_regime};
use pf_core::{AeroTheory, VelocityUnit};
use pf_flutter::{DetectorConfig, FlutterReport, detect, import_records, parse_records};
use pf_solver::SweepEngine;
use pf_structures::{Material, ModalAnalysis, analyze, equivalent_stiffness};
use tracing::{info, warn};

use crate::config::{AnalysisCase, FlowDef, validate_case};
use crate::error::AppResult;
use crate::report::{AnalysisReport, DeckParameters, ENGINE_VERSION, ModeRow, compute_case_id};

/// Material and modes of a case, before any aerodynamics.
#[derive(Clone, Debug)]
pub struct ModesSummary {
    pub material: Material,
    pub modal: ModalAnalysis,
}

impl ModesSummary {
    pub fn rows(&self) -> Vec<ModeRow> {
        self.modal.modes().iter().map(ModeRow::from).collect()
    }
}

pub fn resolve_material(case: &AnalysisCase) -> AppResult<Material> {
    case.material.resolve()
}

/// Free stream at the first sweep velocity.
pub fn flow_template(case: &AnalysisCase) -> AppResult<FlowState> {
    let velocity = case.plan.range.min;
    let flow = match case.flow {
        FlowDef::Standard { altitude } => {
            FlowState::standard_atmosphere(altitude, case.mach, velocity)?
        }
        FlowDef::Explicit {
            density,
            speed_of_sound,
        } => FlowState::new(case.mach, density, speed_of_sound, velocity)?,
    };
    Ok(flow)
}

/// Stiffness and natural modes of the case's panel.
pub fn run_modes(case: &AnalysisCase) -> AppResult<ModesSummary> {
    let material = resolve_material(case)?;
    let stiffness = equivalent_stiffness(&material, &case.geometry)?;
    let modal = analyze(&stiffness, &case.geometry, &case.modal)?;
    Ok(ModesSummary { material, modal })
}

/// Run one case end to end: stiffness, modes, regime, sweep, detection.
pub fn run_analysis(case: &AnalysisCase) -> AppResult<AnalysisReport> {
    validate_case(case)?;
    let case_id = compute_case_id(case);
    let short_id = &case_id[..12];
    info!(name = %case.name, case_id = short_id, mach = case.mach, "Running analysis");

    let modes = run_modes(case)?;
    let decision = select_regime(case.mach, &case.aero.regime)?;
    let theory = build_theory(&decision, &modes.modal, &case.aero)?;
    let template = flow_template(case)?;

    let engine = SweepEngine::new(
        &modes.modal,
        theory.as_ref(),
        template.clone(),
        case.sweep.clone(),
    )?;
    let outcome = if case.stop_at_first_onset {
        engine.run_until(&case.plan, pf_flutter::stop_on_flutter(case.detector))?
    } else {
        engine.run(&case.plan)?
    };

    let flutter = detect(&outcome.sweep, &case.detector)?;
    info!(
        name = %case.name,
        points = outcome.sweep.len(),
        flutter = flutter.result.is_flutter(),
        terminated_early = outcome.terminated_early,
        "Analysis complete"
    );
    if !flutter.diagnostics.is_empty() {
        warn!(count = flutter.diagnostics.len(), "Detector reported diagnostics");
    }

    let mut provenance = modes.modal.provenance().clone();
    provenance.push(decision.approximation());
    for approximation in &outcome.approximations {
        provenance.push(approximation.clone());
    }

    let piston = if decision.theory == AeroTheory::PistonTheory {
        let velocity = flutter
            .result
            .onset()
            .map(|onset| onset.critical_velocity)
            .unwrap_or(case.plan.range.max);
        Some(piston_parameters(
            &template.with_velocity(velocity),
            modes.modal.stiffness(),
            &case.geometry,
        )?)
    } else {
        None
    };

    let deck = DeckParameters {
        material: modes.material.clone(),
        geometry: case.geometry.clone(),
        stiffness: modes.modal.stiffness().clone(),
        modes: modes.rows(),
        flow: template,
    };

    Ok(AnalysisReport {
        case_id,
        name: case.name.clone(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        engine_version: ENGINE_VERSION.to_string(),
        regime: decision,
        deck,
        piston,
        sweep: outcome.sweep,
        flutter,
        provenance,
        terminated_early: outcome.terminated_early,
        refined_points: outcome.refined_points,
    })
}

/// Run the detector on externally produced records given as a JSON array.
pub fn detect_external(
    json: &str,
    unit: VelocityUnit,
    config: &DetectorConfig,
) -> AppResult<FlutterReport> {
    let records = parse_records(json)?;
    let sweep = import_records(&records, unit)?;
    let report = detect(&sweep, config)?;
    info!(
        records = records.len(),
        unit = %unit,
        flutter = report.result.is_flutter(),
        "External records checked"
    );
    Ok(report)
}
