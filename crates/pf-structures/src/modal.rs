//! Closed-form modal analysis of a rectangular plate.
//!
//! Natural frequencies follow Warburton's expression
//!
//! `w^2 = pi^4/(rho h) [D11 Gx^4/a^4 + D22 Gy^4/b^4 + 2 (D12 Hx Hy + 2 D66 Jx Jy)/(a^2 b^2)]`
//!
//! which reduces to `w = pi^2 sqrt(D/(rho h)) [(m/a)^2 + (n/b)^2]` for a
//! simply-supported isotropic panel and to the orthotropic Navier expression for a
//! simply-supported D matrix.

use std::f64::consts::PI;

use pf_core::{Approximation, Frequency, Provenance, ValidationError, hz};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::beam::BeamFunction;
use crate::error::StructuresResult;
use crate::geometry::PanelGeometry;
use crate::stiffness::{EquivalentStiffness, NU_EQUIV};

/// Which stiffness description modal analysis should consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StiffnessRequest {
    /// Use the D matrix when one is available.
    #[default]
    Exact,
    /// Collapse to sqrt(D11*D22) first.
    EquivalentIsotropic,
}

/// Modal analysis configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalOptions {
    /// Number of lowest modes to retain
    pub mode_count: usize,
    pub stiffness: StiffnessRequest,
    /// Poisson ratio for the equivalent-isotropic path
    pub nu_equiv: f64,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            mode_count: 10,
            stiffness: StiffnessRequest::Exact,
            nu_equiv: NU_EQUIV,
        }
    }
}

/// Separable mode shape `W(x, y) = X(x/a) * Y(y/b)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeShape {
    pub x: BeamFunction,
    pub y: BeamFunction,
}

impl ModeShape {
    pub fn value(&self, xi: f64, eta: f64) -> f64 {
        self.x.value(xi) * self.y.value(eta)
    }
}

/// One natural mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeRecord {
    /// Streamwise index
    pub m: usize,
    /// Spanwise index
    pub n: usize,
    /// rad/s
    pub omega: f64,
    pub frequency: Frequency,
    /// kg
    pub generalized_mass: f64,
    pub shape: ModeShape,
}

/// Modes in ascending frequency, with the stiffness and geometry that produced them.
#[derive(Clone, Debug)]
pub struct ModalAnalysis {
    modes: Vec<ModeRecord>,
    stiffness: EquivalentStiffness,
    geometry: PanelGeometry,
    provenance: Provenance,
}

impl ModalAnalysis {
    pub fn modes(&self) -> &[ModeRecord] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Stiffness actually used (already collapsed when equivalent-isotropic was requested).
    pub fn stiffness(&self) -> &EquivalentStiffness {
        &self.stiffness
    }

    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.modes.iter().map(|m| m.frequency.value).collect()
    }

    /// Keep only the lowest `count` modes.
    pub fn truncated(&self, count: usize) -> Self {
        let mut out = self.clone();
        out.modes.truncate(count.max(1));
        out
    }
}

struct Candidate {
    m: usize,
    n: usize,
    omega_sq: f64,
}

/// Enumerate `(m, n)` candidates, drop rigid and non-physical ones, keep the lowest
/// `options.mode_count` sorted by frequency then `(m, n)`.
pub fn analyze(
    stiffness: &EquivalentStiffness,
    geometry: &PanelGeometry,
    options: &ModalOptions,
) -> StructuresResult<ModalAnalysis> {
    geometry.validate()?;
    if options.mode_count == 0 {
        return Err(ValidationError::OutOfRange {
            what: "mode count",
            value: 0.0,
            min: 1.0,
            max: f64::INFINITY,
        }
        .into());
    }

    let stiffness = match options.stiffness {
        StiffnessRequest::Exact => stiffness.clone(),
        StiffnessRequest::EquivalentIsotropic => {
            stiffness.to_equivalent_isotropic(options.nu_equiv)
        }
    };
    let mut provenance = stiffness.provenance.clone();
    if !geometry.edges.is_simply_supported() {
        provenance.push(Approximation::BeamFunctionCoefficients);
    }

    let d = stiffness.bending_matrix();
    let (d11, d12, d22, d66) = (d[(0, 0)], d[(0, 1)], d[(1, 1)], d[(2, 2)]);
    let rho_h = stiffness.mass_per_area();
    let a = geometry.length.value;
    let b = geometry.width.value;
    let edges = geometry.edges;
    let pi4 = PI.powi(4);

    let reference = pi4 / rho_h * (d11 / a.powi(4) + d22 / b.powi(4));
    let rigid_floor = 1e-12 * reference;

    let k_max = options.mode_count + 2;
    let mut candidates = Vec::with_capacity(k_max * k_max);
    let mut rejected_negative = 0usize;
    for m in 1..=k_max {
        let cx = crate::beam::coefficients(edges.x_start, edges.x_end, m);
        for n in 1..=k_max {
            let cy = crate::beam::coefficients(edges.y_start, edges.y_end, n);
            let omega_sq = pi4 / rho_h
                * (d11 * cx.g.powi(4) / a.powi(4)
                    + d22 * cy.g.powi(4) / b.powi(4)
                    + 2.0 * (d12 * cx.h * cy.h + 2.0 * d66 * cx.j * cy.j) / (a * a * b * b));
            if !omega_sq.is_finite() {
                return Err(ValidationError::NonFinite {
                    what: "modal frequency",
                    value: omega_sq,
                }
                .into());
            }
            if omega_sq < -rigid_floor {
                rejected_negative += 1;
                continue;
            }
            if omega_sq <= rigid_floor {
                continue;
            }
            candidates.push(Candidate { m, n, omega_sq });
        }
    }
    if rejected_negative > 0 {
        warn!(
            rejected_negative,
            "Discarded mode candidates with negative stiffness"
        );
    }
    if candidates.is_empty() {
        return Err(ValidationError::Inconsistent {
            what: format!(
                "no mode with positive stiffness ({rejected_negative} candidates had w^2 < 0)"
            ),
        }
        .into());
    }

    candidates.sort_by(|p, q| {
        p.omega_sq
            .total_cmp(&q.omega_sq)
            .then(p.m.cmp(&q.m))
            .then(p.n.cmp(&q.n))
    });
    candidates.truncate(options.mode_count);

    let generalized_mass = rho_h * a * b / 4.0;
    let modes = candidates
        .into_iter()
        .map(|c| {
            let omega = c.omega_sq.sqrt();
            Ok(ModeRecord {
                m: c.m,
                n: c.n,
                omega,
                frequency: hz(omega / (2.0 * PI)),
                generalized_mass,
                shape: ModeShape {
                    x: BeamFunction::new(edges.x_start, edges.x_end, c.m)?,
                    y: BeamFunction::new(edges.y_start, edges.y_end, c.n)?,
                },
            })
        })
        .collect::<StructuresResult<Vec<_>>>()?;

    if modes.len() < options.mode_count {
        debug!(
            requested = options.mode_count,
            retained = modes.len(),
            "Fewer admissible modes than requested"
        );
    }
    info!(
        modes = modes.len(),
        f1_hz = modes[0].frequency.value,
        basis = ?provenance.stiffness_basis,
        "Modal analysis complete"
    );

    Ok(ModalAnalysis {
        modes,
        stiffness,
        geometry: geometry.clone(),
        provenance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{EdgeSupport, EdgeSupports};
    use crate::laminate::Laminate;
    use crate::material::{Isotropic, Lamina, Material, Orthotropic};
    use crate::stiffness::equivalent_stiffness;
    use pf_core::{StiffnessBasis, gpa, kg_per_m3, mm};

    fn aluminium() -> Material {
        Material::Isotropic(Isotropic::new(gpa(71.7), 0.33, kg_per_m3(2810.0)))
    }

    fn panel(edges: EdgeSupports) -> PanelGeometry {
        PanelGeometry::new(mm(500.0), mm(400.0), Some(mm(3.0)), edges).unwrap()
    }

    fn run(material: &Material, geometry: &PanelGeometry) -> ModalAnalysis {
        let s = equivalent_stiffness(material, geometry).unwrap();
        analyze(&s, geometry, &ModalOptions::default()).unwrap()
    }

    #[test]
    fn aluminium_first_mode_anchor() {
        let modal = run(&aluminium(), &panel(EdgeSupports::simply_supported()));
        let f1 = modal.modes()[0].frequency.value;
        assert!((f1 - 74.61).abs() / 74.61 < 0.005, "f1 = {f1}");
        assert_eq!((modal.modes()[0].m, modal.modes()[0].n), (1, 1));
        assert_eq!(modal.len(), 10);
        assert!((modal.modes()[0].generalized_mass - 8.43 * 0.2 / 4.0).abs() < 1e-9);
    }

    #[test]
    fn simply_supported_matches_navier_formula() {
        let geometry = panel(EdgeSupports::simply_supported());
        let s = equivalent_stiffness(&aluminium(), &geometry).unwrap();
        let modal = analyze(&s, &geometry, &ModalOptions::default()).unwrap();
        let d = s.reference_rigidity();
        for mode in modal.modes() {
            let (m, n) = (mode.m as f64, mode.n as f64);
            let omega = PI * PI * (d / s.mass_per_area()).sqrt()
                * ((m / 0.5).powi(2) + (n / 0.4).powi(2));
            assert!((mode.omega - omega).abs() / omega < 1e-9);
        }
    }

    #[test]
    fn modes_ascend_in_expected_order() {
        let modal = run(&aluminium(), &panel(EdgeSupports::simply_supported()));
        let order: Vec<(usize, usize)> = modal.modes()[..6].iter().map(|m| (m.m, m.n)).collect();
        assert_eq!(order, vec![(1, 1), (2, 1), (1, 2), (2, 2), (3, 1), (1, 3)]);
        let f = modal.frequencies_hz();
        assert!(f.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn square_panel_ties_break_lexicographically() {
        let geometry = PanelGeometry::new(
            mm(400.0),
            mm(400.0),
            Some(mm(3.0)),
            EdgeSupports::simply_supported(),
        )
        .unwrap();
        let modal = run(&aluminium(), &geometry);
        assert_eq!((modal.modes()[1].m, modal.modes()[1].n), (1, 2));
        assert_eq!((modal.modes()[2].m, modal.modes()[2].n), (2, 1));
        assert_eq!(modal.modes()[1].omega, modal.modes()[2].omega);
    }

    #[test]
    fn orthotropic_simply_supported_formula() {
        let m = Material::Orthotropic(Orthotropic::new(
            gpa(181.0),
            gpa(10.3),
            0.28,
            gpa(7.17),
            kg_per_m3(1600.0),
        ));
        let geometry = panel(EdgeSupports::simply_supported());
        let s = equivalent_stiffness(&m, &geometry).unwrap();
        let modal = analyze(&s, &geometry, &ModalOptions::default()).unwrap();
        for mode in modal.modes() {
            let (p, q) = (mode.m as f64 / 0.5, mode.n as f64 / 0.4);
            let omega_sq = PI.powi(4) / s.mass_per_area()
                * (s.d11() * p.powi(4)
                    + 2.0 * (s.d12() + 2.0 * s.d66()) * p * p * q * q
                    + s.d22() * q.powi(4));
            assert!((mode.omega.powi(2) - omega_sq).abs() / omega_sq < 1e-9);
        }
        assert_eq!(modal.provenance().stiffness_basis, StiffnessBasis::ExactMatrix);
    }

    #[test]
    fn clamping_stiffens_the_panel() {
        let ss = run(&aluminium(), &panel(EdgeSupports::simply_supported()));
        let cc = run(&aluminium(), &panel(EdgeSupports::clamped()));
        assert!(cc.modes()[0].omega > 1.5 * ss.modes()[0].omega);
        assert!(
            cc.provenance()
                .approximations
                .contains(&Approximation::BeamFunctionCoefficients)
        );
    }

    #[test]
    fn free_panel_excludes_rigid_body_modes() {
        let modal = run(&aluminium(), &panel(EdgeSupports::all(EdgeSupport::Free)));
        assert!(!modal.is_empty());
        for mode in modal.modes() {
            assert!(mode.omega > 1.0);
        }
        // (1, 1) translation, (1, 2) and (2, 1) rotations carry no strain energy
        assert!(
            !modal
                .modes()
                .iter()
                .any(|m| matches!((m.m, m.n), (1, 1) | (1, 2) | (2, 1)))
        );
    }

    #[test]
    fn cantilever_panel_has_low_first_mode() {
        let edges = EdgeSupports {
            x_start: EdgeSupport::Clamped,
            x_end: EdgeSupport::Free,
            y_start: EdgeSupport::Free,
            y_end: EdgeSupport::Free,
        };
        let cantilever = run(&aluminium(), &panel(edges));
        let ss = run(&aluminium(), &panel(EdgeSupports::simply_supported()));
        assert!(cantilever.modes()[0].omega < ss.modes()[0].omega);
    }

    #[test]
    fn equivalent_isotropic_request_is_visible() {
        let carbon = Lamina::Orthotropic(Orthotropic::new(
            gpa(181.0),
            gpa(10.3),
            0.28,
            gpa(7.17),
            kg_per_m3(1600.0),
        ));
        let lam = Laminate::from_angles(carbon, mm(0.25), &[0.0, 90.0, 90.0, 0.0]).unwrap();
        let geometry =
            PanelGeometry::new(mm(500.0), mm(400.0), None, EdgeSupports::simply_supported())
                .unwrap();
        let s = equivalent_stiffness(&Material::Laminate(lam), &geometry).unwrap();
        let options = ModalOptions {
            stiffness: StiffnessRequest::EquivalentIsotropic,
            ..ModalOptions::default()
        };
        let modal = analyze(&s, &geometry, &options).unwrap();
        assert_eq!(
            modal.provenance().stiffness_basis,
            StiffnessBasis::EquivalentIsotropic
        );
        assert!(modal.stiffness().rigidity.is_scalar());
    }

    #[test]
    fn zero_modes_requested_fails() {
        let geometry = panel(EdgeSupports::simply_supported());
        let s = equivalent_stiffness(&aluminium(), &geometry).unwrap();
        let options = ModalOptions {
            mode_count: 0,
            ..ModalOptions::default()
        };
        assert!(analyze(&s, &geometry, &options).is_err());
    }
}
