//! Stiffness invariants across serialization and repeated evaluation.

use pf_core::{gpa, kg_per_m3, mm};
use pf_structures::catalog;
use pf_structures::{
    EdgeSupports, Lamina, Laminate, Material, ModalOptions, PanelGeometry, Ply, analyze,
    equivalent_stiffness,
};
use proptest::prelude::*;

fn panel(thickness_mm: Option<f64>) -> PanelGeometry {
    PanelGeometry::new(
        mm(500.0),
        mm(400.0),
        thickness_mm.map(mm),
        EdgeSupports::simply_supported(),
    )
    .unwrap()
}

fn materials() -> Vec<(Material, PanelGeometry)> {
    let carbon = Lamina::Orthotropic(catalog::t300_5208());
    let glass = Lamina::Orthotropic(catalog::e_glass_epoxy());
    let hybrid = Laminate::new(vec![
        Ply::new(glass.clone(), mm(0.2), 0.0),
        Ply::new(carbon.clone(), mm(0.125), 45.0),
        Ply::new(carbon.clone(), mm(0.125), -45.0),
        Ply::new(carbon, mm(0.125), -45.0),
        Ply::new(Lamina::Orthotropic(catalog::t300_5208()), mm(0.125), 45.0),
        Ply::new(glass, mm(0.2), 0.0),
    ])
    .unwrap();
    vec![
        (
            Material::Isotropic(catalog::aluminium_7075_t6()),
            panel(Some(3.0)),
        ),
        (Material::Orthotropic(catalog::t300_5208()), panel(Some(2.0))),
        (Material::Laminate(hybrid), panel(None)),
    ]
}

#[test]
fn json_round_trip_preserves_stiffness() {
    for (material, geometry) in materials() {
        let json = serde_json::to_string(&material).unwrap();
        let back: Material = serde_json::from_str(&json).unwrap();
        assert_eq!(back, material);
        let a = equivalent_stiffness(&material, &geometry).unwrap();
        let b = equivalent_stiffness(&back, &geometry).unwrap();
        assert_eq!(a, b, "{}", material.kind_name());
    }
}

#[test]
fn yaml_round_trip_preserves_stiffness() {
    for (material, geometry) in materials() {
        let yaml = serde_yaml::to_string(&material).unwrap();
        let back: Material = serde_yaml::from_str(&yaml).unwrap();
        let a = equivalent_stiffness(&material, &geometry).unwrap();
        let b = equivalent_stiffness(&back, &geometry).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn stiffness_is_bit_identical_across_calls() {
    for (material, geometry) in materials() {
        let first = equivalent_stiffness(&material, &geometry).unwrap();
        let second = equivalent_stiffness(&material, &geometry).unwrap();
        assert_eq!(first.d11().to_bits(), second.d11().to_bits());
        assert_eq!(first, second);
    }
}

#[test]
fn yaml_material_is_readable() {
    let yaml = r#"
kind: laminate
plies:
  - material: { kind: orthotropic, e1: 181.0e9, e2: 10.3e9, nu12: 0.28, g12: 7.17e9, density: 1600.0 }
    thickness: 0.00025
    angle_deg: 0.0
  - material: { kind: orthotropic, e1: 181.0e9, e2: 10.3e9, nu12: 0.28, g12: 7.17e9, density: 1600.0 }
    thickness: 0.00025
    angle_deg: 90.0
  - material: { kind: orthotropic, e1: 181.0e9, e2: 10.3e9, nu12: 0.28, g12: 7.17e9, density: 1600.0 }
    thickness: 0.00025
    angle_deg: 90.0
  - material: { kind: orthotropic, e1: 181.0e9, e2: 10.3e9, nu12: 0.28, g12: 7.17e9, density: 1600.0 }
    thickness: 0.00025
    angle_deg: 0.0
"#;
    let material: Material = serde_yaml::from_str(yaml).unwrap();
    let s = equivalent_stiffness(&material, &panel(Some(1.0))).unwrap();
    assert!(s.d11() > s.d22());
    assert!(s.coupling.abs().max() < 1e-6 * s.extensional.abs().max() * s.thickness);
}

#[test]
fn aluminium_panel_first_mode_is_74_61_hz() {
    let material = Material::Isotropic(catalog::aluminium_7075_t6());
    let geometry = panel(Some(3.0));
    let stiffness = equivalent_stiffness(&material, &geometry).unwrap();
    let modal = analyze(&stiffness, &geometry, &ModalOptions::default()).unwrap();
    let f1 = modal.modes()[0].frequency.value;
    assert!((f1 - 74.61).abs() <= 0.005 * 74.61, "f1 = {f1}");
}

proptest! {
    #[test]
    fn isotropic_modal_frequency_scales_with_thickness(t in 0.5f64..10.0) {
        let material = Material::Isotropic(catalog::aluminium_7075_t6());
        let g1 = panel(Some(t));
        let g2 = panel(Some(2.0 * t));
        let s1 = equivalent_stiffness(&material, &g1).unwrap();
        let s2 = equivalent_stiffness(&material, &g2).unwrap();
        let f1 = analyze(&s1, &g1, &ModalOptions::default()).unwrap().modes()[0].omega;
        let f2 = analyze(&s2, &g2, &ModalOptions::default()).unwrap().modes()[0].omega;
        // w ~ sqrt(D / rho h) ~ h
        prop_assert!((f2 / f1 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn material_round_trip_is_exact(
        e in 10.0f64..300.0,
        nu in 0.0f64..0.49,
        rho in 500.0f64..9000.0,
    ) {
        let material = Material::Isotropic(pf_structures::Isotropic::new(gpa(e), nu, kg_per_m3(rho)));
        let json = serde_json::to_string(&material).unwrap();
        let back: Material = serde_json::from_str(&json).unwrap();
        let g = panel(Some(2.0));
        prop_assert_eq!(
            equivalent_stiffness(&material, &g).unwrap(),
            equivalent_stiffness(&back, &g).unwrap()
        );
    }
}
