//! Rectangular panel geometry and edge supports.
//!
//! x runs streamwise along the length `a`, y spanwise along the width `b`.

use pf_core::{Length, ValidationError, ValidationResult, ensure_positive};
use serde::{Deserialize, Serialize};

/// Boundary condition on one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSupport {
    #[default]
    SimplySupported,
    Clamped,
    Free,
}

/// Support on all four edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSupports {
    /// x = 0 (leading edge)
    pub x_start: EdgeSupport,
    /// x = a (trailing edge)
    pub x_end: EdgeSupport,
    /// y = 0
    pub y_start: EdgeSupport,
    /// y = b
    pub y_end: EdgeSupport,
}

impl EdgeSupports {
    pub fn all(support: EdgeSupport) -> Self {
        Self {
            x_start: support,
            x_end: support,
            y_start: support,
            y_end: support,
        }
    }

    pub fn simply_supported() -> Self {
        Self::all(EdgeSupport::SimplySupported)
    }

    pub fn clamped() -> Self {
        Self::all(EdgeSupport::Clamped)
    }

    pub fn is_simply_supported(&self) -> bool {
        [self.x_start, self.x_end, self.y_start, self.y_end]
            .iter()
            .all(|e| *e == EdgeSupport::SimplySupported)
    }
}

/// Panel planform, supports and (for homogeneous materials) thickness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelGeometry {
    /// a, streamwise
    pub length: Length,
    /// b, spanwise
    pub width: Length,
    /// Required for isotropic/orthotropic panels; checked against the stack for laminates.
    #[serde(default)]
    pub thickness: Option<Length>,
    #[serde(default)]
    pub edges: EdgeSupports,
}

impl PanelGeometry {
    pub fn new(
        length: Length,
        width: Length,
        thickness: Option<Length>,
        edges: EdgeSupports,
    ) -> ValidationResult<Self> {
        let geometry = Self {
            length,
            width,
            thickness,
            edges,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        ensure_positive(self.length.value, "panel length")?;
        ensure_positive(self.width.value, "panel width")?;
        if let Some(t) = self.thickness {
            ensure_positive(t.value, "panel thickness")?;
        }
        Ok(())
    }

    /// Thickness for a homogeneous panel, which has no other source for it.
    pub fn required_thickness(&self) -> ValidationResult<f64> {
        let t = self.thickness.ok_or_else(|| ValidationError::Inconsistent {
            what: "homogeneous panel needs an explicit thickness".to_string(),
        })?;
        ensure_positive(t.value, "panel thickness")
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.length.value / self.width.value
    }

    pub fn area(&self) -> f64 {
        self.length.value * self.width.value
    }
}
