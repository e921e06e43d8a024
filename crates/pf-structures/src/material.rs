//! Material specifications.
//!
//! A closed variant: every consumer matches on all three kinds, so a composite can
//! never fall through to isotropic defaults.

use nalgebra::Matrix3;
use pf_core::{
    Density, Pressure, ValidationError, ValidationResult, ensure_in_range, ensure_positive,
};
use serde::{Deserialize, Serialize};

use crate::laminate::Laminate;

/// Homogeneous isotropic material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Isotropic {
    pub youngs_modulus: Pressure,
    pub poisson_ratio: f64,
    pub density: Density,
}

impl Isotropic {
    pub fn new(youngs_modulus: Pressure, poisson_ratio: f64, density: Density) -> Self {
        Self {
            youngs_modulus,
            poisson_ratio,
            density,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        ensure_positive(self.youngs_modulus.value, "Young's modulus")?;
        ensure_in_range(self.poisson_ratio, 0.0, 0.5, "Poisson ratio")?;
        ensure_positive(self.density.value, "density")?;
        Ok(())
    }

    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus.value / (2.0 * (1.0 + self.poisson_ratio))
    }
}

/// Orthotropic lamina in its principal axes. `nu21` follows from reciprocity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orthotropic {
    pub e1: Pressure,
    pub e2: Pressure,
    pub nu12: f64,
    pub g12: Pressure,
    pub density: Density,
}

impl Orthotropic {
    pub fn new(e1: Pressure, e2: Pressure, nu12: f64, g12: Pressure, density: Density) -> Self {
        Self {
            e1,
            e2,
            nu12,
            g12,
            density,
        }
    }

    /// nu21 = nu12 * E2 / E1
    pub fn nu21(&self) -> f64 {
        self.nu12 * self.e2.value / self.e1.value
    }

    pub fn validate(&self) -> ValidationResult<()> {
        ensure_positive(self.e1.value, "E1")?;
        ensure_positive(self.e2.value, "E2")?;
        ensure_positive(self.g12.value, "G12")?;
        ensure_positive(self.density.value, "density")?;
        pf_core::ensure_finite(self.nu12, "nu12")?;
        if self.nu12 < 0.0 {
            return Err(ValidationError::OutOfRange {
                what: "nu12",
                value: self.nu12,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if 1.0 - self.nu12 * self.nu21() <= 0.0 {
            return Err(ValidationError::Inconsistent {
                what: format!(
                    "nu12*nu21 = {} must be below 1 for a positive-definite lamina",
                    self.nu12 * self.nu21()
                ),
            });
        }
        Ok(())
    }
}

/// Material a single ply can be made of.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Lamina {
    Isotropic(Isotropic),
    Orthotropic(Orthotropic),
}

impl Lamina {
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            Self::Isotropic(m) => m.validate(),
            Self::Orthotropic(m) => m.validate(),
        }
    }

    pub fn density(&self) -> f64 {
        match self {
            Self::Isotropic(m) => m.density.value,
            Self::Orthotropic(m) => m.density.value,
        }
    }

    /// Plane-stress reduced stiffness [Q] in the material axes (Pa).
    pub fn reduced_stiffness(&self) -> Matrix3<f64> {
        match self {
            Self::Isotropic(m) => {
                let e = m.youngs_modulus.value;
                let nu = m.poisson_ratio;
                let q11 = e / (1.0 - nu * nu);
                Matrix3::new(
                    q11,
                    nu * q11,
                    0.0,
                    nu * q11,
                    q11,
                    0.0,
                    0.0,
                    0.0,
                    m.shear_modulus(),
                )
            }
            Self::Orthotropic(m) => {
                let denom = 1.0 - m.nu12 * m.nu21();
                let q11 = m.e1.value / denom;
                let q22 = m.e2.value / denom;
                let q12 = m.nu12 * q22;
                Matrix3::new(q11, q12, 0.0, q12, q22, 0.0, 0.0, 0.0, m.g12.value)
            }
        }
    }

    /// [Q-bar]: reduced stiffness rotated into panel axes by `angle_deg`.
    pub fn transformed_stiffness(&self, angle_deg: f64) -> Matrix3<f64> {
        let q = self.reduced_stiffness();
        let (q11, q12, q22, q66) = (q[(0, 0)], q[(0, 1)], q[(1, 1)], q[(2, 2)]);
        let theta = angle_deg.to_radians();
        let (s, c) = theta.sin_cos();
        let (c2, s2) = (c * c, s * s);
        let (c4, s4) = (c2 * c2, s2 * s2);
        let s2c2 = s2 * c2;

        let qb11 = q11 * c4 + 2.0 * (q12 + 2.0 * q66) * s2c2 + q22 * s4;
        let qb22 = q11 * s4 + 2.0 * (q12 + 2.0 * q66) * s2c2 + q22 * c4;
        let qb12 = (q11 + q22 - 4.0 * q66) * s2c2 + q12 * (s4 + c4);
        let qb66 = (q11 + q22 - 2.0 * q12 - 2.0 * q66) * s2c2 + q66 * (s4 + c4);
        let qb16 = (q11 - q12 - 2.0 * q66) * s * c2 * c + (q12 - q22 + 2.0 * q66) * s2 * s * c;
        let qb26 = (q11 - q12 - 2.0 * q66) * s2 * s * c + (q12 - q22 + 2.0 * q66) * s * c2 * c;

        Matrix3::new(
            qb11, qb12, qb16, //
            qb12, qb22, qb26, //
            qb16, qb26, qb66,
        )
    }
}

/// Panel material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Material {
    Isotropic(Isotropic),
    Orthotropic(Orthotropic),
    Laminate(Laminate),
}

impl Material {
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            Self::Isotropic(m) => m.validate(),
            Self::Orthotropic(m) => m.validate(),
            Self::Laminate(l) => l.validate(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Isotropic(_) => "isotropic",
            Self::Orthotropic(_) => "orthotropic",
            Self::Laminate(_) => "laminate",
        }
    }
}
