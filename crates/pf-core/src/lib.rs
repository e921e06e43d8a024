//! pf-core: shared foundation for panelflutter.
//!
//! Contains:
//! - units (uom SI types, constructors, the velocity-unit conversion boundary)
//! - numeric (Real, tolerances, quadrature and interpolation helpers)
//! - error (the shared validation error)
//! - provenance (approximation flags carried alongside every result)
//! - records (sweep points shared by the internal engine and external parsers)

pub mod error;
pub mod numeric;
pub mod provenance;
pub mod records;
pub mod units;

pub use error::{ValidationError, ValidationResult};
pub use numeric::*;
pub use provenance::{AeroTheory, Approximation, PistonOrder, Provenance, StiffnessBasis};
pub use records::{ModeSample, Sweep, SweepPoint, SweepSource};
pub use units::*;
