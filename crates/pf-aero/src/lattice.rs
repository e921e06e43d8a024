//! Subsonic chordwise vortex lattice in strip form.
//!
//! Each spanwise strip is a chordwise row of boxes with the bound vortex at the
//! quarter point and the control point at the three-quarter point. Compressibility
//! enters through the Prandtl-Glauert factor and the phase lag `alpha` of the
//! oscillating kernel. Spanwise coupling only follows the spanwise mode products.

use nalgebra::{Complex, DMatrix};
use pf_core::{AeroTheory, Approximation, ValidationError};
use pf_structures::{ModalAnalysis, PanelGeometry};

use crate::coupling::{AeroContribution, AerodynamicTheory, ModalIntegrals};
use crate::error::{AeroError, AeroResult};
use crate::flow::FlowState;

/// Spanwise products below this are treated as exact zeros.
const SPAN_COUPLING_FLOOR: f64 = 1e-12;
/// Frequency floor used when dividing out `omega` for the damping part.
const OMEGA_FLOOR: f64 = 1e-3;

/// k = omega b / (2 V)
pub fn reduced_frequency(omega: f64, flow: &FlowState, geometry: &PanelGeometry) -> f64 {
    omega * geometry.width.value / (2.0 * flow.velocity.value)
}

/// Strip-theory lattice over a fixed mode set.
pub struct LatticeTheory {
    panels: usize,
    geometry: PanelGeometry,
    y_mass: DMatrix<f64>,
    /// Chordwise shape at control points, per mode
    control_value: Vec<Vec<f64>>,
    /// Chordwise shape at vortex points, per mode
    vortex_value: Vec<Vec<f64>>,
    /// Chordwise slope at vortex points, per mode
    vortex_slope: Vec<Vec<f64>>,
}

impl LatticeTheory {
    pub fn new(modal: &ModalAnalysis, panels: usize) -> AeroResult<Self> {
        if panels == 0 {
            return Err(ValidationError::NonPositive {
                what: "chordwise lattice panels",
                value: 0.0,
            }
            .into());
        }
        let step = 1.0 / panels as f64;
        let control: Vec<f64> = (0..panels).map(|i| (i as f64 + 0.75) * step).collect();
        let vortex: Vec<f64> = (0..panels).map(|j| (j as f64 + 0.25) * step).collect();

        let modes = modal.modes();
        let control_value = modes
            .iter()
            .map(|m| control.iter().map(|&x| m.shape.x.value(x)).collect())
            .collect();
        let vortex_value = modes
            .iter()
            .map(|m| vortex.iter().map(|&x| m.shape.x.value(x)).collect())
            .collect();
        let vortex_slope = modes
            .iter()
            .map(|m| vortex.iter().map(|&x| m.shape.x.slope(x)).collect())
            .collect();

        Ok(Self {
            panels,
            geometry: modal.geometry().clone(),
            y_mass: ModalIntegrals::new(modal).y_mass,
            control_value,
            vortex_value,
            vortex_slope,
        })
    }

    pub fn panels(&self) -> usize {
        self.panels
    }

    /// Complex generalized force matrix at `omega`. Still air carries no load.
    pub fn generalized_forces(
        &self,
        flow: &FlowState,
        omega: f64,
    ) -> AeroResult<DMatrix<Complex<f64>>> {
        if flow.mach >= 1.0 {
            return Err(AeroError::UnsupportedTheory {
                what: format!("subsonic lattice needs Mach < 1, got {}", flow.mach),
            });
        }
        let n = self.y_mass.nrows();
        let v = flow.velocity.value;
        if v < 0.0 {
            return Err(ValidationError::NonPositive {
                what: "free-stream velocity",
                value: v,
            }
            .into());
        }
        if v == 0.0 {
            return Ok(DMatrix::from_element(n, n, Complex::new(0.0, 0.0)));
        }

        let length = self.geometry.length.value;
        let width = self.geometry.width.value;
        let beta = flow.beta();
        let step = 1.0 / self.panels as f64;
        let k = reduced_frequency(omega, flow, &self.geometry);
        let alpha = 2.0 * k * (length / width) * flow.mach.powi(2) / beta.powi(2);
        let pressure_scale = -flow.density.value * v / (std::f64::consts::PI * beta);

        // kernel[i][j] = exp(-i alpha d) / d, d = x_i - xi_j
        let kernel: Vec<Vec<Complex<f64>>> = (0..self.panels)
            .map(|i| {
                (0..self.panels)
                    .map(|j| {
                        let d = (i as f64 - j as f64 + 0.5) * step;
                        Complex::from_polar(1.0, -alpha * d) / d
                    })
                    .collect()
            })
            .collect();

        let mut forces = DMatrix::from_element(n, n, Complex::new(0.0, 0.0));
        for s in 0..n {
            // downwash of mode s at the vortex points
            let downwash: Vec<Complex<f64>> = (0..self.panels)
                .map(|j| {
                    Complex::new(
                        v * self.vortex_slope[s][j] / length,
                        omega * self.vortex_value[s][j],
                    )
                })
                .collect();
            let pressure: Vec<Complex<f64>> = kernel
                .iter()
                .map(|row| {
                    row.iter()
                        .zip(&downwash)
                        .map(|(kern, w)| w * kern * step)
                        .sum::<Complex<f64>>()
                        * pressure_scale
                })
                .collect();
            for r in 0..n {
                let span = self.y_mass[(r, s)];
                if span.abs() < SPAN_COUPLING_FLOOR {
                    continue;
                }
                let chord: Complex<f64> = pressure
                    .iter()
                    .zip(&self.control_value[r])
                    .map(|(p, x)| -p * *x * step)
                    .sum();
                forces[(r, s)] = chord * (length * width * span);
            }
        }
        Ok(forces)
    }
}

impl AerodynamicTheory for LatticeTheory {
    fn theory(&self) -> AeroTheory {
        AeroTheory::SubsonicLattice
    }

    fn is_frequency_dependent(&self) -> bool {
        true
    }

    fn contribution(&self, flow: &FlowState, omega: f64) -> AeroResult<AeroContribution> {
        let forces = self.generalized_forces(flow, omega)?;
        let omega = omega.abs().max(OMEGA_FLOOR);
        Ok(AeroContribution {
            stiffness: forces.map(|q| -q.re),
            damping: forces.map(|q| -q.im / omega),
        })
    }

    fn approximations(&self) -> Vec<Approximation> {
        vec![Approximation::StripTheory {
            chordwise_panels: self.panels,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{kg_per_m3, mm, mps};
    use pf_structures::catalog;
    use pf_structures::{EdgeSupports, Material, ModalOptions, analyze, equivalent_stiffness};

    fn modal() -> ModalAnalysis {
        let g = PanelGeometry::new(
            mm(500.0),
            mm(400.0),
            Some(mm(3.0)),
            EdgeSupports::simply_supported(),
        )
        .unwrap();
        let m = Material::Isotropic(catalog::aluminium_7075_t6());
        let s = equivalent_stiffness(&m, &g).unwrap();
        analyze(&s, &g, &ModalOptions::default()).unwrap()
    }

    fn flow(rho: f64, v: f64) -> FlowState {
        FlowState::new(0.8, kg_per_m3(rho), mps(295.07), mps(v)).unwrap()
    }

    #[test]
    fn fundamental_mode_sees_negative_stiffness_and_positive_damping() {
        let modal = modal();
        let omega = modal.modes()[0].omega;
        let theory = LatticeTheory::new(&modal, 16).unwrap();
        let c = theory.contribution(&flow(0.3639, 100.0), omega).unwrap();
        let (k, d) = c.per_mode()[0];
        assert!((k + 1747.07).abs() < 1.0, "stiffness {k}");
        assert!((d - 0.0905).abs() < 1e-3, "damping {d}");
    }

    #[test]
    fn linear_in_density() {
        let modal = modal();
        let omega = modal.modes()[0].omega;
        let theory = LatticeTheory::new(&modal, 16).unwrap();
        let c1 = theory.contribution(&flow(0.3639, 150.0), omega).unwrap();
        let c2 = theory.contribution(&flow(0.7278, 150.0), omega).unwrap();
        let n = c1.mode_count();
        for r in 0..n {
            for s in 0..n {
                assert!((c2.stiffness[(r, s)] - 2.0 * c1.stiffness[(r, s)]).abs() < 1e-9);
                assert!((c2.damping[(r, s)] - 2.0 * c1.damping[(r, s)]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn no_coupling_across_spanwise_orders() {
        let modal = modal();
        let theory = LatticeTheory::new(&modal, 8).unwrap();
        let forces = theory.generalized_forces(&flow(0.3639, 200.0), 400.0).unwrap();
        let modes = modal.modes();
        for (r, mr) in modes.iter().enumerate() {
            for (s, ms) in modes.iter().enumerate() {
                if mr.n != ms.n {
                    assert_eq!(forces[(r, s)], Complex::new(0.0, 0.0));
                }
            }
        }
    }

    #[test]
    fn depends_on_frequency() {
        let modal = modal();
        let theory = LatticeTheory::new(&modal, 16).unwrap();
        assert!(theory.is_frequency_dependent());
        let low = theory.generalized_forces(&flow(0.3639, 100.0), 100.0).unwrap();
        let high = theory.generalized_forces(&flow(0.3639, 100.0), 1000.0).unwrap();
        assert!((low[(0, 0)] - high[(0, 0)]).norm() > 1.0);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let modal = modal();
        assert!(LatticeTheory::new(&modal, 0).is_err());
        let theory = LatticeTheory::new(&modal, 4).unwrap();
        let supersonic = FlowState::new(1.5, kg_per_m3(1.0), mps(340.0), mps(510.0)).unwrap();
        assert!(matches!(
            theory.contribution(&supersonic, 100.0),
            Err(AeroError::UnsupportedTheory { .. })
        ));
    }

    #[test]
    fn still_air_carries_no_load() {
        let modal = modal();
        let theory = LatticeTheory::new(&modal, 16).unwrap();
        let c = theory.contribution(&flow(0.3639, 0.0), 470.0).unwrap();
        assert!(c.stiffness.iter().all(|k| *k == 0.0));
        assert!(c.damping.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn reduced_frequency_definition() {
        let modal = modal();
        let k = reduced_frequency(500.0, &flow(0.3639, 100.0), modal.geometry());
        assert!((k - 1.0).abs() < 1e-12);
    }
}
