//! Supersonic piston theory.
//!
//! Local pressure `dp = 2q [Ck dw/dx + (Cd/V) dw/dt]`. First order has
//! `Ck = Cd = 1/M`; second and third order add the `1/M^2` expansion terms of the
//! simple-wave relation.

use pf_core::{AeroTheory, Approximation, PistonOrder};
use pf_structures::{EquivalentStiffness, ModalAnalysis, PanelGeometry};
use serde::{Deserialize, Serialize};

use crate::coupling::{AeroContribution, AerodynamicTheory, ModalIntegrals};
use crate::error::{AeroError, AeroResult};
use crate::flow::FlowState;

/// `(Ck, Cd)` for the slope and velocity terms.
pub fn piston_coefficients(order: PistonOrder, mach: f64) -> (f64, f64) {
    let u = 1.0 / (mach * mach);
    let (ck, cd) = match order {
        PistonOrder::First => (1.0, 1.0),
        PistonOrder::Second => (1.0 + 0.5 * u, 1.0 - 0.5 * u),
        PistonOrder::Third => (
            1.0 + 0.5 * u + 0.375 * u * u,
            1.0 - 0.5 * u - 1.125 * u * u,
        ),
    };
    (ck / mach, cd / mach)
}

fn require_supersonic(flow: &FlowState) -> AeroResult<()> {
    if flow.mach <= 1.0 {
        return Err(AeroError::UnsupportedTheory {
            what: format!("piston theory needs supersonic flow, got Mach {}", flow.mach),
        });
    }
    Ok(())
}

/// Non-dimensional piston-theory parameters at one flow state.
///
/// Both the panel-thickness form of lambda and the classical form are reported;
/// neither feeds the eigenproblem.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PistonParameters {
    pub beta: f64,
    /// Pa
    pub dynamic_pressure: f64,
    /// q a^4 / (D h)
    pub lambda: f64,
    /// 2 q a^3 / (beta D)
    pub lambda_classical: f64,
    /// D for isotropic panels, D11 otherwise
    pub reference_rigidity: f64,
}

pub fn piston_parameters(
    flow: &FlowState,
    stiffness: &EquivalentStiffness,
    geometry: &PanelGeometry,
) -> AeroResult<PistonParameters> {
    require_supersonic(flow)?;
    let q = flow.dynamic_pressure();
    let beta = flow.beta();
    let d = stiffness.reference_rigidity();
    let a = geometry.length.value;
    Ok(PistonParameters {
        beta,
        dynamic_pressure: q,
        lambda: q * a.powi(4) / (d * stiffness.thickness),
        lambda_classical: 2.0 * q * a.powi(3) / (beta * d),
        reference_rigidity: d,
    })
}

/// Piston theory over a fixed mode set. Frequency independent.
pub struct PistonTheory {
    order: PistonOrder,
    integrals: ModalIntegrals,
    length: f64,
    width: f64,
}

impl PistonTheory {
    pub fn new(modal: &ModalAnalysis, order: PistonOrder) -> Self {
        Self {
            order,
            integrals: ModalIntegrals::new(modal),
            length: modal.geometry().length.value,
            width: modal.geometry().width.value,
        }
    }

    pub fn order(&self) -> PistonOrder {
        self.order
    }
}

impl AerodynamicTheory for PistonTheory {
    fn theory(&self) -> AeroTheory {
        AeroTheory::PistonTheory
    }

    fn is_frequency_dependent(&self) -> bool {
        false
    }

    fn contribution(&self, flow: &FlowState, _omega: f64) -> AeroResult<AeroContribution> {
        require_supersonic(flow)?;
        let (ck, cd) = piston_coefficients(self.order, flow.mach);
        let q = flow.dynamic_pressure();
        let rho_v = flow.density.value * flow.velocity.value;
        let ints = &self.integrals;

        // 2q/V = rho V, so the damping term stays finite at V = 0
        let stiffness =
            ints.x_slope.component_mul(&ints.y_mass) * (2.0 * q * ck * self.width);
        let damping = ints.x_mass.component_mul(&ints.y_mass)
            * (rho_v * cd * self.length * self.width);
        Ok(AeroContribution { stiffness, damping })
    }

    fn approximations(&self) -> Vec<Approximation> {
        vec![Approximation::PistonTheory { order: self.order }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{kg_per_m3, mm, mps};
    use pf_structures::catalog;
    use pf_structures::{EdgeSupports, Material, ModalOptions, analyze, equivalent_stiffness};

    fn setup() -> (ModalAnalysis, EquivalentStiffness, PanelGeometry) {
        let g = PanelGeometry::new(
            mm(500.0),
            mm(400.0),
            Some(mm(3.0)),
            EdgeSupports::simply_supported(),
        )
        .unwrap();
        let m = Material::Isotropic(catalog::aluminium_7075_t6());
        let s = equivalent_stiffness(&m, &g).unwrap();
        let modal = analyze(&s, &g, &ModalOptions::default()).unwrap();
        (modal, s, g)
    }

    fn flow(mach: f64, v: f64) -> FlowState {
        FlowState::new(mach, kg_per_m3(1.225), mps(340.0), mps(v)).unwrap()
    }

    #[test]
    fn coefficient_orders() {
        let (ck1, cd1) = piston_coefficients(PistonOrder::First, 2.0);
        let (ck2, cd2) = piston_coefficients(PistonOrder::Second, 2.0);
        let (ck3, cd3) = piston_coefficients(PistonOrder::Third, 2.0);
        assert_eq!((ck1, cd1), (0.5, 0.5));
        assert!((ck2 - 0.5 * 1.125).abs() < 1e-15);
        assert!(ck3 > ck2 && ck2 > ck1);
        assert!(cd3 < cd2 && cd2 < cd1);
    }

    #[test]
    fn high_mach_orders_converge() {
        let (ck1, _) = piston_coefficients(PistonOrder::First, 10.0);
        let (ck3, _) = piston_coefficients(PistonOrder::Third, 10.0);
        assert!((ck3 - ck1).abs() / ck1 < 0.01);
    }

    #[test]
    fn stiffness_is_antisymmetric_damping_diagonal() {
        let (modal, _, _) = setup();
        let theory = PistonTheory::new(&modal, PistonOrder::First);
        let c = theory.contribution(&flow(2.0, 500.0), 0.0).unwrap();
        let n = c.mode_count();
        let scale = c.stiffness.abs().max();
        assert!(scale > 0.0);
        for r in 0..n {
            assert!(c.stiffness[(r, r)].abs() < 1e-6 * scale);
            for s in 0..n {
                assert!((c.stiffness[(r, s)] + c.stiffness[(s, r)]).abs() < 1e-5 * scale);
            }
        }
        let expected = 1.225 * 500.0 * 0.5 * 0.5 * 0.4 * 0.25;
        assert!((c.damping[(0, 0)] - expected).abs() / expected < 1e-8);
        assert!(c.damping[(0, 1)].abs() < 1e-8 * expected);
    }

    #[test]
    fn scaling_with_velocity() {
        let (modal, _, _) = setup();
        let theory = PistonTheory::new(&modal, PistonOrder::Third);
        let c1 = theory.contribution(&flow(2.0, 400.0), 0.0).unwrap();
        let c2 = theory.contribution(&flow(2.0, 800.0), 0.0).unwrap();
        let k = c2.stiffness.abs().max() / c1.stiffness.abs().max();
        let d = c2.damping[(0, 0)] / c1.damping[(0, 0)];
        assert!((k - 4.0).abs() < 1e-9);
        assert!((d - 2.0).abs() < 1e-9);
    }

    #[test]
    fn subsonic_flow_is_unsupported() {
        let (modal, s, g) = setup();
        let theory = PistonTheory::new(&modal, PistonOrder::First);
        assert!(matches!(
            theory.contribution(&flow(0.8, 200.0), 0.0),
            Err(AeroError::UnsupportedTheory { .. })
        ));
        assert!(piston_parameters(&flow(0.8, 200.0), &s, &g).is_err());
    }

    #[test]
    fn lambda_forms() {
        let (_, s, g) = setup();
        let f = flow(2.0, 680.0);
        let p = piston_parameters(&f, &s, &g).unwrap();
        let q = 0.5 * 1.225 * 680.0 * 680.0;
        let d = s.reference_rigidity();
        assert!((p.lambda - q * 0.5f64.powi(4) / (d * 0.003)).abs() / p.lambda < 1e-9);
        assert!(
            (p.lambda_classical - 2.0 * q * 0.125 / (3f64.sqrt() * d)).abs() / p.lambda_classical
                < 1e-9
        );
        assert!(p.lambda > p.lambda_classical);
    }
}
