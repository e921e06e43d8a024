//! Flags describing which approximations produced a number.
//!
//! Safety margins downstream depend on knowing these, so every result that can be
//! affected by an approximation carries a [`Provenance`].

use std::fmt;

/// What kind of bending stiffness fed modal analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StiffnessBasis {
    /// Isotropic material, scalar flexural rigidity D.
    ScalarIsotropic,
    /// Full orthotropic or laminate D matrix.
    ExactMatrix,
    /// D matrix collapsed to sqrt(D11*D22) with an assumed Poisson ratio.
    EquivalentIsotropic,
}

/// Aerodynamic theory used for the coupling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AeroTheory {
    SubsonicLattice,
    PistonTheory,
}

impl fmt::Display for AeroTheory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubsonicLattice => write!(f, "subsonic lattice"),
            Self::PistonTheory => write!(f, "piston theory"),
        }
    }
}

/// Piston theory expansion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PistonOrder {
    #[default]
    First,
    Second,
    Third,
}

impl PistonOrder {
    pub fn as_number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

/// A single approximation taken somewhere in the pipeline.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Approximation {
    /// D matrix replaced by an equivalent isotropic rigidity.
    EquivalentIsotropic { nu_equiv: f64 },
    /// Laminate has non-zero B (bending-extension) terms that modal analysis ignores.
    BendingExtensionNeglected { coupling_ratio: f64 },
    /// D16/D26 (bend-twist) terms present but ignored by the closed-form modes.
    BendTwistNeglected { coupling_ratio: f64 },
    /// Non simply-supported edges use beam-function coefficients.
    BeamFunctionCoefficients,
    /// Subsonic lattice applied strip-wise along the chord.
    StripTheory { chordwise_panels: usize },
    /// Piston theory truncated at the given order.
    PistonTheory { order: PistonOrder },
    /// Theory chosen automatically from the Mach number.
    RegimeSelection { theory: AeroTheory, mach: f64 },
    /// Uniform structural damping added as equivalent viscous damping.
    StructuralDamping { g: f64 },
}

/// Everything a result needs to say about how it was produced.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Provenance {
    pub stiffness_basis: StiffnessBasis,
    pub approximations: Vec<Approximation>,
}

impl Provenance {
    pub fn new(stiffness_basis: StiffnessBasis) -> Self {
        Self {
            stiffness_basis,
            approximations: Vec::new(),
        }
    }

    /// Record an approximation once.
    pub fn push(&mut self, approximation: Approximation) {
        if !self.approximations.contains(&approximation) {
            self.approximations.push(approximation);
        }
    }

    pub fn merged(mut self, other: &Provenance) -> Self {
        for a in &other.approximations {
            self.push(a.clone());
        }
        self
    }

    pub fn is_approximate(&self) -> bool {
        self.stiffness_basis == StiffnessBasis::EquivalentIsotropic
            || !self.approximations.is_empty()
    }

    pub fn theory(&self) -> Option<AeroTheory> {
        self.approximations.iter().find_map(|a| match a {
            Approximation::RegimeSelection { theory, .. } => Some(*theory),
            _ => None,
        })
    }
}
