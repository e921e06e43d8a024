//! Coupled structural + aerodynamic eigenproblem in modal coordinates.
//!
//! `M q'' + (C_s + C_a) q' + (K_s + K_a) q = 0` is written in first-order form
//! `x' = A x` with `A = [[0, I], [-M^-1 K, -M^-1 C]]` and solved with a real Schur
//! decomposition. A root `p = sigma + i omega` gives damping `g = 2 sigma / |p|`
//! (positive is unstable) and frequency `|omega| / 2 pi`.

use nalgebra::linalg::Schur;
use nalgebra::{Complex, DMatrix, DVector};
use pf_aero::AeroContribution;
use pf_core::ValidationError;
use pf_structures::ModalAnalysis;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::SweepResult;

/// Schur iteration controls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EigenConfig {
    pub eps: f64,
    /// 0 means unbounded
    pub max_iterations: usize,
}

impl Default for EigenConfig {
    fn default() -> Self {
        Self {
            eps: f64::EPSILON,
            max_iterations: 10_000,
        }
    }
}

/// Structural matrices of a mode set, diagonal in modal coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct ModalSystem {
    mass: DVector<f64>,
    stiffness: DVector<f64>,
    damping: DVector<f64>,
    omega: Vec<f64>,
}

impl ModalSystem {
    /// `structural_damping` is the uniform coefficient g_s, applied as
    /// `g_s * omega_r * M_r` viscous damping per mode.
    pub fn new(modal: &ModalAnalysis, structural_damping: f64) -> SweepResult<Self> {
        if modal.is_empty() {
            return Err(ValidationError::Empty { what: "mode set" }.into());
        }
        let modes = modal.modes();
        let mass = DVector::from_iterator(modes.len(), modes.iter().map(|m| m.generalized_mass));
        let omega: Vec<f64> = modes.iter().map(|m| m.omega).collect();
        let stiffness = DVector::from_iterator(
            modes.len(),
            modes.iter().map(|m| m.omega * m.omega * m.generalized_mass),
        );
        let damping = DVector::from_iterator(
            modes.len(),
            modes
                .iter()
                .map(|m| structural_damping * m.omega * m.generalized_mass),
        );
        Ok(Self {
            mass,
            stiffness,
            damping,
            omega,
        })
    }

    pub fn mode_count(&self) -> usize {
        self.mass.len()
    }

    /// Natural frequency of mode `r`, rad/s.
    pub fn omega(&self, r: usize) -> f64 {
        self.omega[r]
    }

    /// `i omega_r` for the `count` lowest modes: the roots of the structure in still air.
    pub fn natural_roots(&self, count: usize) -> Vec<Complex<f64>> {
        self.omega
            .iter()
            .take(count)
            .map(|&w| Complex::new(0.0, w))
            .collect()
    }

    /// First-order state matrix with `aero` added to the structure.
    pub fn state_matrix(&self, aero: &AeroContribution) -> DMatrix<f64> {
        let n = self.mode_count();
        let mut a = DMatrix::zeros(2 * n, 2 * n);
        for i in 0..n {
            a[(i, n + i)] = 1.0;
            let inv_mass = 1.0 / self.mass[i];
            for j in 0..n {
                let mut k = aero.stiffness[(i, j)];
                let mut c = aero.damping[(i, j)];
                if i == j {
                    k += self.stiffness[i];
                    c += self.damping[i];
                }
                a[(n + i, j)] = -k * inv_mass;
                a[(n + i, n + j)] = -c * inv_mass;
            }
        }
        a
    }

    /// All `2N` roots, or `None` when the Schur iteration does not converge.
    pub fn roots(
        &self,
        aero: &AeroContribution,
        config: &EigenConfig,
    ) -> SweepResult<Option<Vec<Complex<f64>>>> {
        if aero.mode_count() != self.mode_count() {
            return Err(ValidationError::Inconsistent {
                what: format!(
                    "aerodynamic matrices cover {} modes, structure has {}",
                    aero.mode_count(),
                    self.mode_count()
                ),
            }
            .into());
        }
        let a = self.state_matrix(aero);
        Ok(Schur::try_new(a, config.eps, config.max_iterations)
            .map(|schur| schur.complex_eigenvalues().iter().copied().collect()))
    }
}

/// Imaginary parts at or below this, relative to |p|, are treated as real roots.
const REAL_ROOT_TOLERANCE: f64 = 1e-9;

fn is_real(p: &Complex<f64>) -> bool {
    p.im.abs() <= REAL_ROOT_TOLERANCE * p.norm().max(1.0)
}

/// One root per mode out of the `2N` roots of the state matrix.
///
/// An oscillatory mode is represented by the upper member of its conjugate pair.
/// A mode past static divergence has split into two real roots of opposite sign
/// and similar magnitude; it is represented by the positive one, so the
/// instability shows up as g = +2. Opposite-sign real roots are paired closest
/// in magnitude first. Remaining real roots (overdamped modes) pair up in
/// descending order, each pair represented by its larger member.
pub fn mode_roots(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut modes: Vec<Complex<f64>> = roots
        .iter()
        .copied()
        .filter(|p| !is_real(p) && p.im > 0.0)
        .collect();
    let mut real: Vec<f64> = roots.iter().filter(|p| is_real(p)).map(|p| p.re).collect();
    real.sort_by(|a, b| b.total_cmp(a));

    loop {
        let mirror = real
            .iter()
            .enumerate()
            .filter(|(_, r)| **r > 0.0)
            .flat_map(|(i, &pos)| {
                real.iter()
                    .enumerate()
                    .filter(|(_, r)| **r < 0.0)
                    .map(move |(j, &neg)| ((pos + neg).abs(), i, j))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));
        let Some((_, i, j)) = mirror else {
            break;
        };
        modes.push(Complex::new(real[i], 0.0));
        // i < j: positives precede negatives in descending order
        real.remove(j);
        real.remove(i);
    }
    modes.extend(real.iter().step_by(2).map(|&r| Complex::new(r, 0.0)));
    modes
}

/// g = 2 Re(p) / |p|
pub fn damping_ratio(p: Complex<f64>) -> f64 {
    let norm = p.norm();
    if norm == 0.0 { 0.0 } else { 2.0 * p.re / norm }
}

pub fn frequency_hz(p: Complex<f64>) -> f64 {
    p.im.abs() / (2.0 * PI)
}
