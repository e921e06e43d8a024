//! The aerodynamic-structural coupling seam.

use nalgebra::DMatrix;
use pf_core::{AeroTheory, Approximation, PistonOrder, simpson};
use pf_structures::ModalAnalysis;
use serde::{Deserialize, Serialize};

use crate::error::AeroResult;
use crate::flow::FlowState;
use crate::lattice::LatticeTheory;
use crate::piston::PistonTheory;
use crate::regime::{RegimeConfig, RegimeDecision};

const INTEGRAL_INTERVALS: usize = 1024;

/// Generalized aerodynamic matrices added to the structural stiffness and damping.
#[derive(Clone, Debug, PartialEq)]
pub struct AeroContribution {
    /// N/m per unit generalized coordinate
    pub stiffness: DMatrix<f64>,
    /// N*s/m per unit generalized coordinate
    pub damping: DMatrix<f64>,
}

impl AeroContribution {
    pub fn zeros(n: usize) -> Self {
        Self {
            stiffness: DMatrix::zeros(n, n),
            damping: DMatrix::zeros(n, n),
        }
    }

    pub fn mode_count(&self) -> usize {
        self.stiffness.nrows()
    }

    /// Diagonal `(stiffness, damping)` per mode.
    pub fn per_mode(&self) -> Vec<(f64, f64)> {
        (0..self.mode_count())
            .map(|i| (self.stiffness[(i, i)], self.damping[(i, i)]))
            .collect()
    }
}

/// An aerodynamic theory able to produce generalized forces for a fixed mode set.
pub trait AerodynamicTheory: Send + Sync {
    fn theory(&self) -> AeroTheory;

    /// True when the contribution depends on the oscillation frequency.
    fn is_frequency_dependent(&self) -> bool;

    /// Contribution at `flow` for oscillation at `omega` rad/s.
    fn contribution(&self, flow: &FlowState, omega: f64) -> AeroResult<AeroContribution>;

    /// Approximations this theory introduces.
    fn approximations(&self) -> Vec<Approximation>;
}

/// Aerodynamic configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AeroOptions {
    pub regime: RegimeConfig,
    pub piston_order: PistonOrder,
    /// Chordwise lattice boxes for the subsonic theory
    pub chordwise_panels: usize,
}

impl Default for AeroOptions {
    fn default() -> Self {
        Self {
            regime: RegimeConfig::default(),
            piston_order: PistonOrder::First,
            chordwise_panels: 16,
        }
    }
}

/// Shape products integrated over the unit square, shared by both theories.
#[derive(Clone, Debug, PartialEq)]
pub struct ModalIntegrals {
    /// integral X_r X_s dxi
    pub x_mass: DMatrix<f64>,
    /// integral X_r dX_s/dxi dxi
    pub x_slope: DMatrix<f64>,
    /// integral Y_r Y_s deta
    pub y_mass: DMatrix<f64>,
}

impl ModalIntegrals {
    pub fn new(modal: &ModalAnalysis) -> Self {
        let modes = modal.modes();
        let n = modes.len();
        let mut x_mass = DMatrix::zeros(n, n);
        let mut x_slope = DMatrix::zeros(n, n);
        let mut y_mass = DMatrix::zeros(n, n);
        for (r, mr) in modes.iter().enumerate() {
            for (s, ms) in modes.iter().enumerate() {
                let (xr, xs) = (mr.shape.x, ms.shape.x);
                let (yr, ys) = (mr.shape.y, ms.shape.y);
                x_mass[(r, s)] =
                    simpson(0.0, 1.0, INTEGRAL_INTERVALS, |x| xr.value(x) * xs.value(x));
                x_slope[(r, s)] =
                    simpson(0.0, 1.0, INTEGRAL_INTERVALS, |x| xr.value(x) * xs.slope(x));
                y_mass[(r, s)] =
                    simpson(0.0, 1.0, INTEGRAL_INTERVALS, |y| yr.value(y) * ys.value(y));
            }
        }
        Self {
            x_mass,
            x_slope,
            y_mass,
        }
    }
}

/// Theory implementation for a regime decision over `modal`.
pub fn build_theory(
    decision: &RegimeDecision,
    modal: &ModalAnalysis,
    options: &AeroOptions,
) -> AeroResult<Box<dyn AerodynamicTheory>> {
    Ok(match decision.theory {
        AeroTheory::PistonTheory => Box::new(PistonTheory::new(modal, options.piston_order)),
        AeroTheory::SubsonicLattice => {
            Box::new(LatticeTheory::new(modal, options.chordwise_panels)?)
        }
    })
}
