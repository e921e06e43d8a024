//! pf-aero: aerodynamic coupling for panel modes.
//!
//! - flow: free-stream state (Mach, density, speed of sound, velocity)
//! - atmosphere: ISA standard atmosphere for altitude-defined flow
//! - regime: Mach-number regime decision and the excluded transonic band
//! - piston: supersonic piston theory, orders 1 to 3
//! - lattice: subsonic chordwise lattice with a compressible kernel
//! - coupling: the [`AerodynamicTheory`] seam consumed by the sweep engine

pub mod atmosphere;
pub mod coupling;
pub mod error;
pub mod flow;
pub mod lattice;
pub mod piston;
pub mod regime;

pub use atmosphere::{AtmosphereState, standard_atmosphere};
pub use coupling::{AeroContribution, AeroOptions, AerodynamicTheory, ModalIntegrals, build_theory};
pub use error::{AeroError, AeroResult};
pub use flow::FlowState;
pub use lattice::{LatticeTheory, reduced_frequency};
pub use piston::{PistonParameters, PistonTheory, piston_coefficients, piston_parameters};
pub use regime::{RegimeConfig, RegimeDecision, select_regime};
