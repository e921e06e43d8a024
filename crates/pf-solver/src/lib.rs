//! pf-solver: the velocity sweep engine.
//!
//! - plan: velocity grid and step policies
//! - eigen: coupled structural + aerodynamic eigenproblem
//! - pk: p-k iteration for frequency-dependent aerodynamics
//! - tracking: mode continuation across velocity-independent steps
//! - engine: parallel step execution, gap accounting, early termination

pub mod eigen;
pub mod engine;
pub mod error;
pub mod pk;
pub mod plan;
pub mod tracking;

pub use eigen::{EigenConfig, ModalSystem, damping_ratio, frequency_hz, mode_roots};
pub use engine::{SweepEngine, SweepOptions, SweepOutcome};
pub use error::{SweepError, SweepResult};
pub use pk::{PkConfig, PkRoot, roots_at, solve_pk, solve_pk_modes};
pub use plan::{MAX_SWEEP_POINTS, Spacing, StepPolicy, SweepPlan, VelocityRange};
pub use tracking::{match_roots, track};
