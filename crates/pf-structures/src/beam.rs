//! Beam functions along one panel direction.
//!
//! Frequencies use Warburton's closed-form coefficients (G, H, J) for each pair of
//! edge supports, so the support pair is a parameter of one formula rather than a
//! separate code path. Mode shapes are the characteristic beam functions, solved as
//! the null vector of the edge-condition matrix in the basis
//! `exp(-lx), exp(-l(1-x)), cos(lx), sin(lx)` with `l = G*pi`, which stays bounded
//! for high mode numbers.

use std::f64::consts::PI;

use nalgebra::Matrix4;
use pf_core::{ValidationError, simpson};

use crate::error::{StructuresError, StructuresResult};
use crate::geometry::EdgeSupport;

const NORM_INTERVALS: usize = 512;

/// Warburton coefficients for one direction.
///
/// G replaces the mode number in the bending term, H and J enter the
/// cross-curvature and twist terms. Simply-supported pairs give `G = m`,
/// `H = J = m^2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamCoefficients {
    pub g: f64,
    pub h: f64,
    pub j: f64,
}

impl BeamCoefficients {
    fn uniform(g: f64, h_edge: f64, j_edge: f64) -> Self {
        // Edge corrections scale with G / pi
        Self {
            g,
            h: g * g * (1.0 - h_edge / (g * PI)),
            j: g * g * (1.0 + j_edge / (g * PI)),
        }
    }
}

/// Coefficients for mode `m >= 1` between supports `start` (x = 0) and `end` (x = 1).
pub fn coefficients(start: EdgeSupport, end: EdgeSupport, m: usize) -> BeamCoefficients {
    use EdgeSupport::{Clamped, Free, SimplySupported};

    let mf = m as f64;
    match (start, end) {
        (SimplySupported, SimplySupported) => BeamCoefficients {
            g: mf,
            h: mf * mf,
            j: mf * mf,
        },
        (Clamped, Clamped) => match m {
            1 => BeamCoefficients {
                g: 1.506,
                h: 1.248,
                j: 1.248,
            },
            _ => BeamCoefficients::uniform(mf + 0.5, 2.0, -2.0),
        },
        (Clamped, SimplySupported) | (SimplySupported, Clamped) => {
            BeamCoefficients::uniform(mf + 0.25, 1.0, -1.0)
        }
        (Free, Free) => match m {
            1 => BeamCoefficients {
                g: 0.0,
                h: 0.0,
                j: 0.0,
            },
            2 => BeamCoefficients {
                g: 0.0,
                h: 0.0,
                j: 12.0 / (PI * PI),
            },
            3 => BeamCoefficients {
                g: 1.506,
                h: 1.248,
                j: 5.017,
            },
            _ => BeamCoefficients::uniform(mf - 1.5, 2.0, 6.0),
        },
        (Clamped, Free) | (Free, Clamped) => match m {
            1 => BeamCoefficients {
                g: 0.597,
                h: -0.0870,
                j: 0.471,
            },
            2 => BeamCoefficients {
                g: 1.494,
                h: 1.347,
                j: 3.284,
            },
            _ => BeamCoefficients::uniform(mf - 0.5, 2.0, 2.0),
        },
        (SimplySupported, Free) | (Free, SimplySupported) => match m {
            1 => BeamCoefficients {
                g: 0.0,
                h: 0.0,
                j: 3.0 / (PI * PI),
            },
            _ => BeamCoefficients::uniform(mf - 0.75, 1.0, 3.0),
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Shape {
    Translation,
    Rotation { pivot: f64 },
    Elastic { lambda: f64, c: [f64; 4] },
}

/// Mode shape along one direction, normalized to `integral_0^1 X^2 = 1/2`
/// (the value for `sin(m*pi*x)`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamFunction {
    pub start: EdgeSupport,
    pub end: EdgeSupport,
    pub index: usize,
    pub coefficients: BeamCoefficients,
    shape: Shape,
    scale: f64,
}

impl BeamFunction {
    pub fn new(start: EdgeSupport, end: EdgeSupport, index: usize) -> StructuresResult<Self> {
        if index == 0 {
            return Err(ValidationError::OutOfRange {
                what: "beam mode index",
                value: 0.0,
                min: 1.0,
                max: f64::INFINITY,
            }
            .into());
        }
        let coefficients = coefficients(start, end, index);
        let shape = if coefficients.g == 0.0 {
            rigid_shape(start, end, index)?
        } else {
            let lambda = coefficients.g * PI;
            Shape::Elastic {
                lambda,
                c: null_vector(start, end, lambda)?,
            }
        };

        let mut beam = Self {
            start,
            end,
            index,
            coefficients,
            shape,
            scale: 1.0,
        };
        let norm = simpson(0.0, 1.0, NORM_INTERVALS, |x| beam.raw_value(x).powi(2));
        if !(norm.is_finite() && norm > 0.0) {
            return Err(StructuresError::Numeric {
                what: format!("degenerate beam function {start:?}-{end:?} m={index}"),
            });
        }
        let mut scale = (0.5 / norm).sqrt();
        let leading = (1..64)
            .map(|k| beam.raw_value(k as f64 / 64.0))
            .find(|v| v.abs() > 1e-8);
        if leading.is_some_and(|v| v < 0.0) {
            scale = -scale;
        }
        beam.scale = scale;
        Ok(beam)
    }

    pub fn is_rigid(&self) -> bool {
        !matches!(self.shape, Shape::Elastic { .. })
    }

    /// X(xi), xi in [0, 1]
    pub fn value(&self, xi: f64) -> f64 {
        self.scale * self.raw_value(xi)
    }

    /// dX/dxi
    pub fn slope(&self, xi: f64) -> f64 {
        self.scale * self.raw_slope(xi)
    }

    fn raw_value(&self, xi: f64) -> f64 {
        match self.shape {
            Shape::Translation => 1.0,
            Shape::Rotation { pivot } => xi - pivot,
            Shape::Elastic { lambda, c } => dot(&c, &basis(lambda, xi, 0)),
        }
    }

    fn raw_slope(&self, xi: f64) -> f64 {
        match self.shape {
            Shape::Translation => 0.0,
            Shape::Rotation { .. } => 1.0,
            Shape::Elastic { lambda, c } => lambda * dot(&c, &basis(lambda, xi, 1)),
        }
    }
}

fn rigid_shape(start: EdgeSupport, end: EdgeSupport, index: usize) -> StructuresResult<Shape> {
    use EdgeSupport::{Free, SimplySupported};
    match (start, end, index) {
        (Free, Free, 1) => Ok(Shape::Translation),
        (Free, Free, 2) => Ok(Shape::Rotation { pivot: 0.5 }),
        (SimplySupported, Free, 1) => Ok(Shape::Rotation { pivot: 0.0 }),
        (Free, SimplySupported, 1) => Ok(Shape::Rotation { pivot: 1.0 }),
        _ => Err(StructuresError::Numeric {
            what: format!("no rigid shape for {start:?}-{end:?} m={index}"),
        }),
    }
}

/// k-th derivative of the basis at `xi`, divided by `lambda^k`.
fn basis(lambda: f64, xi: f64, k: u8) -> [f64; 4] {
    let e1 = (-lambda * xi).exp();
    let e2 = (-lambda * (1.0 - xi)).exp();
    let (s, c) = (lambda * xi).sin_cos();
    match k % 4 {
        0 => [e1, e2, c, s],
        1 => [-e1, e2, -s, c],
        2 => [e1, e2, -c, -s],
        _ => [-e1, e2, s, -c],
    }
}

fn dot(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn edge_orders(edge: EdgeSupport) -> [u8; 2] {
    match edge {
        EdgeSupport::SimplySupported => [0, 2],
        EdgeSupport::Clamped => [0, 1],
        EdgeSupport::Free => [2, 3],
    }
}

fn null_vector(start: EdgeSupport, end: EdgeSupport, lambda: f64) -> StructuresResult<[f64; 4]> {
    let mut rows = [[0.0; 4]; 4];
    let conditions = edge_orders(start)
        .map(|k| (0.0, k))
        .into_iter()
        .chain(edge_orders(end).map(|k| (1.0, k)));
    for (row, (xi, k)) in rows.iter_mut().zip(conditions) {
        *row = basis(lambda, xi, k);
    }
    let matrix = Matrix4::from_fn(|i, j| rows[i][j]);
    let svd = matrix.svd(false, true);
    let v_t = svd.v_t.ok_or_else(|| StructuresError::Numeric {
        what: "edge-condition SVD did not produce V".to_string(),
    })?;
    let smallest = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(3);
    let v = v_t.row(smallest);
    Ok([v[0], v[1], v[2], v[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use EdgeSupport::{Clamped, Free, SimplySupported};

    const ALL: [EdgeSupport; 3] = [SimplySupported, Clamped, Free];

    #[test]
    fn simply_supported_is_sine() {
        for m in 1..=5 {
            let beam = BeamFunction::new(SimplySupported, SimplySupported, m).unwrap();
            for k in 0..=20 {
                let x = k as f64 / 20.0;
                let expected = (m as f64 * PI * x).sin();
                assert!((beam.value(x) - expected).abs() < 1e-9, "m={m} x={x}");
                let slope = m as f64 * PI * (m as f64 * PI * x).cos();
                assert!((beam.slope(x) - slope).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn coefficients_are_symmetric_in_edge_order() {
        for a in ALL {
            for b in ALL {
                for m in 1..6 {
                    assert_eq!(coefficients(a, b, m), coefficients(b, a, m));
                }
            }
        }
    }

    #[test]
    fn every_shape_is_normalized() {
        for a in ALL {
            for b in ALL {
                for m in 1..6 {
                    let beam = BeamFunction::new(a, b, m).unwrap();
                    let norm = simpson(0.0, 1.0, 1024, |x| beam.value(x).powi(2));
                    assert!((norm - 0.5).abs() < 1e-6, "{a:?}-{b:?} m={m}: {norm}");
                }
            }
        }
    }

    #[test]
    fn clamped_edges_have_zero_deflection_and_slope() {
        for m in 1..5 {
            let beam = BeamFunction::new(Clamped, Clamped, m).unwrap();
            let peak = beam.coefficients.g * PI;
            assert!(beam.value(0.0).abs() < 5e-3);
            assert!(beam.value(1.0).abs() < 5e-3);
            assert!(beam.slope(0.0).abs() < 5e-3 * peak);
            assert!(beam.slope(1.0).abs() < 5e-3 * peak);
        }
    }

    #[test]
    fn cantilever_first_mode_grows_toward_free_end() {
        let beam = BeamFunction::new(Clamped, Free, 1).unwrap();
        assert!(!beam.is_rigid());
        assert!(beam.value(0.0).abs() < 5e-3);
        assert!(beam.value(1.0).abs() > beam.value(0.5).abs());
    }

    #[test]
    fn free_free_rigid_modes() {
        let translation = BeamFunction::new(Free, Free, 1).unwrap();
        assert!(translation.is_rigid());
        assert!((translation.value(0.3) - 0.5f64.sqrt()).abs() < 1e-9);
        let rotation = BeamFunction::new(Free, Free, 2).unwrap();
        assert!(rotation.value(0.5).abs() < 1e-12);
        assert!((rotation.slope(0.2).abs() - 6f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn pinned_free_rotates_about_pinned_edge() {
        let beam = BeamFunction::new(Free, SimplySupported, 1).unwrap();
        assert!(beam.value(1.0).abs() < 1e-12);
        assert!(beam.value(0.0) > 0.0);
    }

    #[test]
    fn zero_index_rejected() {
        assert!(BeamFunction::new(SimplySupported, SimplySupported, 0).is_err());
    }
}
