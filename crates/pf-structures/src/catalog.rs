//! Reference materials by name.

use pf_core::{gpa, kg_per_m3};

use crate::material::{Isotropic, Lamina, Material, Orthotropic};

pub const NAMES: &[&str] = &[
    "aluminium_7075_t6",
    "aluminium_2024_t3",
    "titanium_ti6al4v",
    "t300_5208",
    "e_glass_epoxy",
];

pub fn aluminium_7075_t6() -> Isotropic {
    Isotropic::new(gpa(71.7), 0.33, kg_per_m3(2810.0))
}

pub fn aluminium_2024_t3() -> Isotropic {
    Isotropic::new(gpa(73.1), 0.33, kg_per_m3(2780.0))
}

pub fn titanium_ti6al4v() -> Isotropic {
    Isotropic::new(gpa(113.8), 0.342, kg_per_m3(4430.0))
}

/// Unidirectional carbon/epoxy lamina.
pub fn t300_5208() -> Orthotropic {
    Orthotropic::new(gpa(181.0), gpa(10.3), 0.28, gpa(7.17), kg_per_m3(1600.0))
}

/// Unidirectional E-glass/epoxy lamina.
pub fn e_glass_epoxy() -> Orthotropic {
    Orthotropic::new(gpa(38.6), gpa(8.27), 0.26, gpa(4.14), kg_per_m3(1800.0))
}

/// Ply material by catalog name.
pub fn lamina(name: &str) -> Option<Lamina> {
    match name {
        "aluminium_7075_t6" => Some(Lamina::Isotropic(aluminium_7075_t6())),
        "aluminium_2024_t3" => Some(Lamina::Isotropic(aluminium_2024_t3())),
        "titanium_ti6al4v" => Some(Lamina::Isotropic(titanium_ti6al4v())),
        "t300_5208" => Some(Lamina::Orthotropic(t300_5208())),
        "e_glass_epoxy" => Some(Lamina::Orthotropic(e_glass_epoxy())),
        _ => None,
    }
}

/// Homogeneous panel material by catalog name.
pub fn material(name: &str) -> Option<Material> {
    lamina(name).map(|l| match l {
        Lamina::Isotropic(m) => Material::Isotropic(m),
        Lamina::Orthotropic(m) => Material::Orthotropic(m),
    })
}
