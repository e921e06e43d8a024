//! Velocity grid generation.
//!
//! A plan is a velocity range plus a step policy. Fixed-step and point-count
//! policies produce the whole grid up front; the adaptive policy starts from a
//! coarse grid and the engine bisects intervals where damping changes sign.

use pf_core::{Velocity, ValidationError, ValidationResult, ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Most velocities one plan may ask for, refinement included.
pub const MAX_SWEEP_POINTS: usize = 100_000;

fn ensure_point_count(what: &'static str, count: f64) -> ValidationResult<()> {
    if count > MAX_SWEEP_POINTS as f64 {
        return Err(ValidationError::OutOfRange {
            what,
            value: count,
            min: 2.0,
            max: MAX_SWEEP_POINTS as f64,
        });
    }
    Ok(())
}

/// Spacing of a fixed point-count grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    #[default]
    Linear,
    Logarithmic,
}

/// How sweep velocities are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepPolicy {
    /// Uniform step; the range end is always included.
    Fixed { step: Velocity },
    /// Fixed number of points including both ends.
    Count {
        points: usize,
        #[serde(default)]
        spacing: Spacing,
    },
    /// Uniform coarse step, refined by bisection down to `min_step` wherever any
    /// tracked damping changes sign.
    Adaptive { step: Velocity, min_step: Velocity },
}

/// Closed velocity interval swept in increasing order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VelocityRange {
    pub min: Velocity,
    pub max: Velocity,
}

impl VelocityRange {
    pub fn new(min: Velocity, max: Velocity) -> ValidationResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        ensure_finite(self.min.value, "minimum sweep velocity")?;
        ensure_finite(self.max.value, "maximum sweep velocity")?;
        if self.min.value < 0.0 {
            return Err(ValidationError::OutOfRange {
                what: "minimum sweep velocity",
                value: self.min.value,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if self.max.value <= self.min.value {
            return Err(ValidationError::Inconsistent {
                what: format!(
                    "sweep range end {} m/s must exceed its start {} m/s",
                    self.max.value, self.min.value
                ),
            });
        }
        Ok(())
    }

    pub fn span(&self) -> f64 {
        self.max.value - self.min.value
    }
}

/// Velocity range and step policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub range: VelocityRange,
    pub policy: StepPolicy,
}

impl SweepPlan {
    pub fn new(range: VelocityRange, policy: StepPolicy) -> ValidationResult<Self> {
        let plan = Self { range, policy };
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        self.range.validate()?;
        match self.policy {
            StepPolicy::Fixed { step } => {
                ensure_positive(step.value, "sweep step")?;
                ensure_point_count("sweep point count", self.range.span() / step.value + 1.0)
            }
            StepPolicy::Count { points, spacing } => {
                if points < 2 {
                    return Err(ValidationError::OutOfRange {
                        what: "sweep point count",
                        value: points as f64,
                        min: 2.0,
                        max: f64::INFINITY,
                    });
                }
                ensure_point_count("sweep point count", points as f64)?;
                if spacing == Spacing::Logarithmic && self.range.min.value <= 0.0 {
                    return Err(ValidationError::NonPositive {
                        what: "logarithmic sweep start velocity",
                        value: self.range.min.value,
                    });
                }
                Ok(())
            }
            StepPolicy::Adaptive { step, min_step } => {
                ensure_positive(step.value, "sweep step")?;
                ensure_positive(min_step.value, "minimum sweep step")?;
                if min_step.value > step.value {
                    return Err(ValidationError::Inconsistent {
                        what: format!(
                            "minimum sweep step {} m/s exceeds the coarse step {} m/s",
                            min_step.value, step.value
                        ),
                    });
                }
                ensure_point_count(
                    "refined sweep point count",
                    self.range.span() / min_step.value + 1.0,
                )
            }
        }
    }

    /// Initial grid in m/s, strictly increasing.
    pub fn grid(&self) -> Vec<f64> {
        let (lo, hi) = (self.range.min.value, self.range.max.value);
        match self.policy {
            StepPolicy::Fixed { step } | StepPolicy::Adaptive { step, .. } => {
                uniform_step(lo, hi, step.value)
            }
            StepPolicy::Count {
                points,
                spacing: Spacing::Linear,
            } => linear(lo, hi, points),
            StepPolicy::Count {
                points,
                spacing: Spacing::Logarithmic,
            } => logarithmic(lo, hi, points),
        }
    }

    /// Smallest interval the engine may bisect, for adaptive plans.
    pub fn refinement_floor(&self) -> Option<f64> {
        match self.policy {
            StepPolicy::Adaptive { min_step, .. } => Some(min_step.value),
            _ => None,
        }
    }
}

fn uniform_step(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let slack = 1e-9 * step;
    let count = ((hi - lo + slack) / step).floor() as usize;
    let mut points: Vec<f64> = (0..=count).map(|i| lo + i as f64 * step).collect();
    match points.last_mut() {
        Some(last) if (hi - *last).abs() <= slack => *last = hi,
        _ => points.push(hi),
    }
    points
}

fn linear(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let delta = (hi - lo) / (n - 1) as f64;
    let mut points: Vec<f64> = (0..n).map(|i| lo + i as f64 * delta).collect();
    // Ensure exact endpoint
    points[n - 1] = hi;
    points
}

fn logarithmic(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let (log_lo, log_hi) = (lo.ln(), hi.ln());
    let delta = (log_hi - log_lo) / (n - 1) as f64;
    let mut points: Vec<f64> = (0..n).map(|i| (log_lo + i as f64 * delta).exp()).collect();
    points[0] = lo;
    points[n - 1] = hi;
    points
}

impl fmt::Display for StepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed { step } => write!(f, "fixed step {} m/s", step.value),
            Self::Count { points, spacing } => write!(f, "{points} points ({spacing:?})"),
            Self::Adaptive { step, min_step } => write!(
                f,
                "adaptive step {} m/s refined to {} m/s",
                step.value, min_step.value
            ),
        }
    }
}
