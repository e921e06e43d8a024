//! Equivalent bending stiffness of a panel.

use nalgebra::Matrix3;
use pf_core::{
    Approximation, Pressure, Provenance, StiffnessBasis, ValidationError, nearly_equal, pa,
    Tolerances,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StructuresResult;
use crate::geometry::PanelGeometry;
use crate::material::{Lamina, Material};

/// Poisson ratio assumed when a D matrix is collapsed to an isotropic rigidity.
pub const NU_EQUIV: f64 = 0.3;

/// Coupling terms smaller than this (relative) count as absent.
const COUPLING_FLOOR: f64 = 1e-9;

/// Bending rigidity: a scalar D for isotropic panels, the full matrix otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rigidity {
    Scalar { d: f64, nu: f64 },
    Matrix { d: Matrix3<f64> },
}

impl Rigidity {
    /// D matrix in N*m. The scalar case expands to the isotropic plate matrix.
    pub fn bending_matrix(&self) -> Matrix3<f64> {
        match *self {
            Self::Scalar { d, nu } => Matrix3::new(
                d,
                nu * d,
                0.0,
                nu * d,
                d,
                0.0,
                0.0,
                0.0,
                0.5 * (1.0 - nu) * d,
            ),
            Self::Matrix { d } => d,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar { .. })
    }
}

/// Equivalent-isotropic view of a stiffness.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquivalentIsotropic {
    /// sqrt(D11 * D22)
    pub d_equiv: f64,
    pub youngs_modulus_equiv: Pressure,
    pub nu_equiv: f64,
}

/// Stiffness description consumed by modal analysis. A value object: derive a new
/// one whenever material or geometry change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquivalentStiffness {
    pub rigidity: Rigidity,
    /// A matrix, N/m
    pub extensional: Matrix3<f64>,
    /// B matrix, N
    pub coupling: Matrix3<f64>,
    /// m
    pub thickness: f64,
    /// Smeared density, kg/m^3
    pub density: f64,
    pub provenance: Provenance,
}

impl EquivalentStiffness {
    pub fn bending_matrix(&self) -> Matrix3<f64> {
        self.rigidity.bending_matrix()
    }

    pub fn d11(&self) -> f64 {
        self.bending_matrix()[(0, 0)]
    }

    pub fn d22(&self) -> f64 {
        self.bending_matrix()[(1, 1)]
    }

    pub fn d12(&self) -> f64 {
        self.bending_matrix()[(0, 1)]
    }

    pub fn d66(&self) -> f64 {
        self.bending_matrix()[(2, 2)]
    }

    pub fn d16(&self) -> f64 {
        self.bending_matrix()[(0, 2)]
    }

    pub fn d26(&self) -> f64 {
        self.bending_matrix()[(1, 2)]
    }

    /// rho * h, kg/m^2
    pub fn mass_per_area(&self) -> f64 {
        self.density * self.thickness
    }

    /// Scalar rigidity used for non-dimensional parameters: D itself, or D11.
    pub fn reference_rigidity(&self) -> f64 {
        match self.rigidity {
            Rigidity::Scalar { d, .. } => d,
            Rigidity::Matrix { d } => d[(0, 0)],
        }
    }

    pub fn equivalent_isotropic(&self, nu_equiv: f64) -> EquivalentIsotropic {
        let d_equiv = (self.d11() * self.d22()).sqrt();
        let h3 = self.thickness.powi(3);
        EquivalentIsotropic {
            d_equiv,
            youngs_modulus_equiv: pa(12.0 * d_equiv * (1.0 - nu_equiv * nu_equiv) / h3),
            nu_equiv,
        }
    }

    /// Collapse to a scalar rigidity for consumers that cannot use a D matrix.
    ///
    /// Scalar stiffness is returned unchanged. Otherwise the result is flagged as an
    /// equivalent-isotropic approximation.
    pub fn to_equivalent_isotropic(&self, nu_equiv: f64) -> EquivalentStiffness {
        if self.rigidity.is_scalar() {
            return self.clone();
        }
        let eq = self.equivalent_isotropic(nu_equiv);
        warn!(
            d11 = self.d11(),
            d22 = self.d22(),
            d_equiv = eq.d_equiv,
            nu_equiv,
            "Using equivalent-isotropic rigidity in place of the D matrix"
        );
        let mut provenance = self.provenance.clone();
        provenance.stiffness_basis = StiffnessBasis::EquivalentIsotropic;
        provenance.push(Approximation::EquivalentIsotropic { nu_equiv });
        EquivalentStiffness {
            rigidity: Rigidity::Scalar {
                d: eq.d_equiv,
                nu: nu_equiv,
            },
            provenance,
            ..self.clone()
        }
    }
}

/// Derive the equivalent stiffness of `material` on `geometry`.
pub fn equivalent_stiffness(
    material: &Material,
    geometry: &PanelGeometry,
) -> StructuresResult<EquivalentStiffness> {
    geometry.validate()?;
    material.validate()?;

    let stiffness = match material {
        Material::Isotropic(iso) => {
            let h = geometry.required_thickness()?;
            let e = iso.youngs_modulus.value;
            let nu = iso.poisson_ratio;
            let d = e * h.powi(3) / (12.0 * (1.0 - nu * nu));
            let q = Lamina::Isotropic(iso.clone()).reduced_stiffness();
            EquivalentStiffness {
                rigidity: Rigidity::Scalar { d, nu },
                extensional: q * h,
                coupling: Matrix3::zeros(),
                thickness: h,
                density: iso.density.value,
                provenance: Provenance::new(StiffnessBasis::ScalarIsotropic),
            }
        }
        Material::Orthotropic(ortho) => {
            let h = geometry.required_thickness()?;
            let q = Lamina::Orthotropic(ortho.clone()).reduced_stiffness();
            EquivalentStiffness {
                rigidity: Rigidity::Matrix {
                    d: q * (h.powi(3) / 12.0),
                },
                extensional: q * h,
                coupling: Matrix3::zeros(),
                thickness: h,
                density: ortho.density.value,
                provenance: Provenance::new(StiffnessBasis::ExactMatrix),
            }
        }
        Material::Laminate(laminate) => {
            let h = laminate.thickness();
            if let Some(t) = geometry.thickness {
                let tol = Tolerances {
                    abs: 1e-9,
                    rel: 1e-6,
                };
                if !nearly_equal(t.value, h, tol) {
                    return Err(ValidationError::Inconsistent {
                        what: format!(
                            "panel thickness {} m does not match laminate stack {} m",
                            t.value, h
                        ),
                    }
                    .into());
                }
            }
            let abd = laminate.abd()?;
            let mut provenance = Provenance::new(StiffnessBasis::ExactMatrix);

            let coupling_ratio =
                abd.b.abs().max() / (abd.a.abs().max() * abd.d.abs().max()).sqrt();
            if coupling_ratio > COUPLING_FLOOR {
                warn!(
                    coupling_ratio,
                    symmetric = laminate.is_symmetric(),
                    "Laminate has bending-extension coupling; modal analysis neglects B"
                );
                provenance.push(Approximation::BendingExtensionNeglected { coupling_ratio });
            }

            let twist_ratio = abd.d[(0, 2)].abs().max(abd.d[(1, 2)].abs())
                / (abd.d[(0, 0)] * abd.d[(1, 1)]).sqrt();
            if twist_ratio > COUPLING_FLOOR {
                warn!(
                    twist_ratio,
                    "Laminate has bend-twist terms D16/D26; closed-form modes neglect them"
                );
                provenance.push(Approximation::BendTwistNeglected {
                    coupling_ratio: twist_ratio,
                });
            }

            EquivalentStiffness {
                rigidity: Rigidity::Matrix { d: abd.d },
                extensional: abd.a,
                coupling: abd.b,
                thickness: h,
                density: laminate.smeared_density(),
                provenance,
            }
        }
    };

    debug!(
        material = material.kind_name(),
        d11 = stiffness.d11(),
        d22 = stiffness.d22(),
        thickness = stiffness.thickness,
        density = stiffness.density,
        "Derived equivalent stiffness"
    );
    Ok(stiffness)
}
