//! pf-structures: material stiffness and modal analysis of rectangular panels.
//!
//! Material (isotropic, orthotropic, laminate) -> [`EquivalentStiffness`] via
//! classical lamination theory -> [`ModalAnalysis`] from closed-form plate
//! frequencies and beam-function mode shapes.

pub mod beam;
pub mod catalog;
pub mod error;
pub mod geometry;
pub mod laminate;
pub mod material;
pub mod modal;
pub mod stiffness;

pub use beam::{BeamCoefficients, BeamFunction};
pub use error::{StructuresError, StructuresResult};
pub use geometry::{EdgeSupport, EdgeSupports, PanelGeometry};
pub use laminate::{Abd, Laminate, Ply};
pub use material::{Isotropic, Lamina, Material, Orthotropic};
pub use modal::{ModalAnalysis, ModalOptions, ModeRecord, ModeShape, StiffnessRequest, analyze};
pub use stiffness::{
    EquivalentIsotropic, EquivalentStiffness, NU_EQUIV, Rigidity, equivalent_stiffness,
};
