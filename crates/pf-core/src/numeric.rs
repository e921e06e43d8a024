use crate::ValidationError;

/// Floating point type used throughout the system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, ValidationError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ValidationError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, ValidationError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(ValidationError::NonPositive { what, value: v })
    }
}

/// Finite and inside the half-open interval `[min, max)`.
pub fn ensure_in_range(
    v: Real,
    min: Real,
    max: Real,
    what: &'static str,
) -> Result<Real, ValidationError> {
    let v = ensure_finite(v, what)?;
    if v >= min && v < max {
        Ok(v)
    } else {
        Err(ValidationError::OutOfRange {
            what,
            value: v,
            min,
            max,
        })
    }
}

/// Composite Simpson rule on `[lo, hi]`. `intervals` is rounded up to an even count.
pub fn simpson<F>(lo: Real, hi: Real, intervals: usize, f: F) -> Real
where
    F: Fn(Real) -> Real,
{
    let n = intervals.max(2).next_multiple_of(2);
    let h = (hi - lo) / n as Real;
    let mut sum = f(lo) + f(hi);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(lo + i as Real * h);
    }
    sum * h / 3.0
}

/// Linear interpolation of `y` at `x` between `(x0, y0)` and `(x1, y1)`.
pub fn lerp(x0: Real, y0: Real, x1: Real, y1: Real, x: Real) -> Real {
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Abscissa where the line through `(x0, y0)` and `(x1, y1)` crosses zero.
///
/// Returns `None` for a horizontal segment.
pub fn zero_crossing(x0: Real, y0: Real, x1: Real, y1: Real) -> Option<Real> {
    let dy = y1 - y0;
    if dy == 0.0 {
        return None;
    }
    Some(x0 - y0 * (x1 - x0) / dy)
}
