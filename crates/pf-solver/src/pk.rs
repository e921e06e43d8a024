//! p-k iteration for frequency-dependent aerodynamics.
//!
//! Each tracked mode starts from a seed root, normally its converged root at the
//! previous velocity step. The aerodynamic matrices are evaluated at the trial
//! frequency, the coupled roots are found, and the root nearest the current
//! estimate in the complex plane supplies the next trial frequency. Iteration
//! stops when the frequency settles.

use nalgebra::Complex;
use pf_aero::{AerodynamicTheory, FlowState};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eigen::{EigenConfig, ModalSystem, mode_roots};
use crate::error::{SweepError, SweepResult};
use crate::tracking::match_roots;

/// Convergence controls for the p-k loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PkConfig {
    /// Frequency change, relative to the mode's natural frequency
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for PkConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 40,
        }
    }
}

/// A converged root and the trial frequency (rad/s) it settled at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PkRoot {
    pub root: Complex<f64>,
    pub omega: f64,
}

/// One root per mode with the aerodynamics evaluated at `omega`.
pub fn roots_at(
    system: &ModalSystem,
    theory: &dyn AerodynamicTheory,
    flow: &FlowState,
    omega: f64,
    eigen: &EigenConfig,
) -> SweepResult<Vec<Complex<f64>>> {
    let aero = theory.contribution(flow, omega)?;
    let roots = system
        .roots(&aero, eigen)?
        .ok_or_else(|| SweepError::StepFailed {
            velocity: flow.velocity.value,
            what: format!("eigen-solve did not converge at {omega:.3} rad/s"),
        })?;
    Ok(mode_roots(&roots))
}

/// Converged root for mode `mode`, continued from `seed`.
///
/// Aerodynamic failures propagate; a failed eigen-solve or a loop that does not
/// settle is a [`SweepError::StepFailed`].
pub fn solve_pk(
    system: &ModalSystem,
    theory: &dyn AerodynamicTheory,
    flow: &FlowState,
    mode: usize,
    seed: Complex<f64>,
    pk: &PkConfig,
    eigen: &EigenConfig,
) -> SweepResult<PkRoot> {
    let velocity = flow.velocity.value;
    let scale = system.omega(mode);
    let mut estimate = seed;
    let mut omega = seed.im.abs();

    for iteration in 0..pk.max_iterations {
        let root = roots_at(system, theory, flow, omega, eigen)?
            .into_iter()
            .min_by(|a, b| (a - estimate).norm().total_cmp(&(b - estimate).norm()))
            .ok_or_else(|| SweepError::StepFailed {
                velocity,
                what: format!("no root for mode {mode}"),
            })?;

        let next = root.im.abs();
        if (next - omega).abs() < pk.tolerance * scale {
            debug!(velocity, mode, iteration, "p-k converged");
            return Ok(PkRoot { root, omega });
        }
        estimate = root;
        omega = next;
    }

    Err(SweepError::StepFailed {
        velocity,
        what: format!(
            "p-k iteration for mode {mode} did not converge in {} iterations",
            pk.max_iterations
        ),
    })
}

fn same_root(a: Complex<f64>, b: Complex<f64>, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance * a.norm().max(b.norm()).max(1.0)
}

/// Roots of every tracked mode, `seeds[r]` continuing slot `r`.
///
/// No two slots may hold the same physical root. Slots that settled on one root
/// at one trial frequency share a root set and are assigned from it jointly, each
/// to the candidate nearest its seed. Any other collision fails the step.
pub fn solve_pk_modes(
    system: &ModalSystem,
    theory: &dyn AerodynamicTheory,
    flow: &FlowState,
    seeds: &[Complex<f64>],
    pk: &PkConfig,
    eigen: &EigenConfig,
) -> SweepResult<Vec<Complex<f64>>> {
    let velocity = flow.velocity.value;
    let solved: Vec<PkRoot> = seeds
        .par_iter()
        .enumerate()
        .map(|(mode, seed)| solve_pk(system, theory, flow, mode, *seed, pk, eigen))
        .collect::<SweepResult<_>>()?;
    let mut roots: Vec<Complex<f64>> = solved.iter().map(|s| s.root).collect();

    for i in 0..roots.len() {
        let group: Vec<usize> = (0..roots.len())
            .filter(|&j| same_root(roots[i], roots[j], pk.tolerance))
            .collect();
        if group.len() < 2 {
            continue;
        }
        let collision = || SweepError::StepFailed {
            velocity,
            what: format!("modes {group:?} converged on the same root"),
        };
        let omega = solved[i].omega;
        let settled = |j: usize, w: f64| (w - omega).abs() < pk.tolerance * system.omega(j);
        if !group.iter().all(|&j| settled(j, solved[j].omega)) {
            return Err(collision());
        }

        let candidates = roots_at(system, theory, flow, omega, eigen)?;
        if candidates.len() < group.len() {
            return Err(collision());
        }
        let previous: Vec<Complex<f64>> = group.iter().map(|&j| seeds[j]).collect();
        for (&j, root) in group.iter().zip(match_roots(&previous, &candidates)) {
            if !settled(j, root.im.abs()) {
                return Err(collision());
            }
            roots[j] = root;
        }
        debug!(velocity, ?group, "Separated modes sharing one root");
    }

    for (i, a) in roots.iter().enumerate() {
        if let Some(j) = roots[i + 1..].iter().position(|b| same_root(*a, *b, pk.tolerance)) {
            return Err(SweepError::StepFailed {
                velocity,
                what: format!("modes {i} and {} converged on the same root", i + 1 + j),
            });
        }
    }
    Ok(roots)
}
