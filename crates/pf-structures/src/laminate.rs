//! Laminate stacks and classical lamination theory.
//!
//! Plies are listed bottom to top; z is measured from the mid-plane, so the first
//! ply spans `[-h/2, -h/2 + t_1]`.

use nalgebra::Matrix3;
use pf_core::{Length, ValidationError, ValidationResult, ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};

use crate::material::Lamina;

/// One ply: material, thickness, orientation in degrees from the panel x axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ply {
    pub material: Lamina,
    pub thickness: Length,
    pub angle_deg: f64,
}

impl Ply {
    pub fn new(material: Lamina, thickness: Length, angle_deg: f64) -> Self {
        Self {
            material,
            thickness,
            angle_deg,
        }
    }
}

/// Ordered ply stack. Insertion order is through-thickness order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Laminate {
    plies: Vec<Ply>,
}

/// Extensional (A, N/m), coupling (B, N) and bending (D, N*m) stiffness matrices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Abd {
    pub a: Matrix3<f64>,
    pub b: Matrix3<f64>,
    pub d: Matrix3<f64>,
}

impl Laminate {
    pub fn new(plies: Vec<Ply>) -> ValidationResult<Self> {
        let laminate = Self { plies };
        laminate.validate()?;
        Ok(laminate)
    }

    /// Plies of one material and thickness at the given angles, bottom first.
    pub fn from_angles(
        material: Lamina,
        ply_thickness: Length,
        angles_deg: &[f64],
    ) -> ValidationResult<Self> {
        let plies = angles_deg
            .iter()
            .map(|&angle| Ply::new(material.clone(), ply_thickness, angle))
            .collect();
        Self::new(plies)
    }

    /// Mirror a half stack about the mid-plane: `[a, b]` becomes `[a, b, b, a]`.
    pub fn symmetric(half: Vec<Ply>) -> ValidationResult<Self> {
        let mut plies = half.clone();
        plies.extend(half.into_iter().rev());
        Self::new(plies)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.plies.is_empty() {
            return Err(ValidationError::Empty { what: "laminate" });
        }
        for ply in &self.plies {
            ply.material.validate()?;
            ensure_positive(ply.thickness.value, "ply thickness")?;
            ensure_finite(ply.angle_deg, "ply angle")?;
        }
        Ok(())
    }

    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    pub fn thickness(&self) -> f64 {
        self.plies.iter().map(|p| p.thickness.value).sum()
    }

    /// Sum of rho_k * t_k over the total thickness.
    pub fn smeared_density(&self) -> f64 {
        let areal: f64 = self
            .plies
            .iter()
            .map(|p| p.material.density() * p.thickness.value)
            .sum();
        areal / self.thickness()
    }

    /// True when the stack mirrors about the mid-plane (material, thickness, angle).
    pub fn is_symmetric(&self) -> bool {
        let n = self.plies.len();
        (0..n / 2).all(|i| {
            let lo = &self.plies[i];
            let hi = &self.plies[n - 1 - i];
            lo.material == hi.material
                && (lo.thickness.value - hi.thickness.value).abs()
                    <= 1e-12 * lo.thickness.value.max(hi.thickness.value)
                && (lo.angle_deg - hi.angle_deg).abs() <= 1e-9
        })
    }

    /// Integrate [Q-bar] through the thickness.
    pub fn abd(&self) -> ValidationResult<Abd> {
        self.validate()?;
        let mut a = Matrix3::zeros();
        let mut b = Matrix3::zeros();
        let mut d = Matrix3::zeros();

        let mut z_bottom = -0.5 * self.thickness();
        for ply in &self.plies {
            let z_top = z_bottom + ply.thickness.value;
            let qbar = ply.material.transformed_stiffness(ply.angle_deg);
            a += qbar * (z_top - z_bottom);
            b += qbar * (0.5 * (z_top.powi(2) - z_bottom.powi(2)));
            d += qbar * ((z_top.powi(3) - z_bottom.powi(3)) / 3.0);
            z_bottom = z_top;
        }
        Ok(Abd { a, b, d })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Isotropic, Orthotropic};
    use pf_core::{gpa, kg_per_m3, mm};
    use proptest::prelude::*;

    fn carbon() -> Lamina {
        Lamina::Orthotropic(Orthotropic::new(
            gpa(181.0),
            gpa(10.3),
            0.28,
            gpa(7.17),
            kg_per_m3(1600.0),
        ))
    }

    #[test]
    fn empty_laminate_rejected() {
        assert!(matches!(
            Laminate::new(vec![]),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn zero_thickness_ply_rejected() {
        let err = Laminate::from_angles(carbon(), mm(0.0), &[0.0, 90.0]).unwrap_err();
        assert!(matches!(err, ValidationError::NonPositive { .. }));
    }

    #[test]
    fn single_isotropic_ply_matches_plate_rigidity() {
        let al = Isotropic::new(gpa(71.7), 0.33, kg_per_m3(2810.0));
        let h = 0.003;
        let lam = Laminate::from_angles(Lamina::Isotropic(al), mm(3.0), &[0.0]).unwrap();
        let abd = lam.abd().unwrap();
        let d = 71.7e9 * h * h * h / (12.0 * (1.0 - 0.33 * 0.33));
        assert!((abd.d[(0, 0)] - d).abs() / d < 1e-12);
        assert!(abd.b.abs().max() < 1e-6);
    }

    #[test]
    fn cross_ply_unsymmetric_has_coupling() {
        let lam = Laminate::from_angles(carbon(), mm(0.125), &[0.0, 90.0]).unwrap();
        assert!(!lam.is_symmetric());
        let abd = lam.abd().unwrap();
        assert!(abd.b[(0, 0)].abs() > 1.0);
    }

    #[test]
    fn symmetric_builder_mirrors() {
        let half = vec![
            Ply::new(carbon(), mm(0.125), 0.0),
            Ply::new(carbon(), mm(0.125), 45.0),
        ];
        let lam = Laminate::symmetric(half).unwrap();
        let angles: Vec<f64> = lam.plies().iter().map(|p| p.angle_deg).collect();
        assert_eq!(angles, vec![0.0, 45.0, 45.0, 0.0]);
        assert!(lam.is_symmetric());
        assert!((lam.thickness() - 0.0005).abs() < 1e-15);
    }

    #[test]
    fn smeared_density_weights_by_thickness() {
        let heavy = Lamina::Isotropic(Isotropic::new(gpa(70.0), 0.3, kg_per_m3(3000.0)));
        let light = Lamina::Isotropic(Isotropic::new(gpa(70.0), 0.3, kg_per_m3(1000.0)));
        let lam = Laminate::new(vec![
            Ply::new(heavy, mm(1.0), 0.0),
            Ply::new(light, mm(3.0), 0.0),
        ])
        .unwrap();
        assert!((lam.smeared_density() - 1500.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn symmetric_laminates_have_zero_coupling(
            angles in prop::collection::vec(-90.0f64..90.0, 1..5),
            t in 0.05f64..0.5,
        ) {
            let half = angles
                .iter()
                .map(|&a| Ply::new(carbon(), mm(t), a))
                .collect();
            let lam = Laminate::symmetric(half).unwrap();
            let abd = lam.abd().unwrap();
            let scale = abd.a.abs().max() * lam.thickness();
            prop_assert!(abd.b.abs().max() <= 1e-9 * scale);
        }

        #[test]
        fn abd_is_idempotent(angles in prop::collection::vec(-90.0f64..90.0, 1..6)) {
            let lam = Laminate::from_angles(carbon(), mm(0.2), &angles).unwrap();
            let first = lam.abd().unwrap();
            let second = lam.abd().unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
