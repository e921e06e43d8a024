//! Velocity/damping/frequency records.
//!
//! The same shape is produced by the internal sweep engine and by conversion of
//! externally parsed solver output, so the onset detector runs unmodified on either.

use crate::{Frequency, ValidationError, ValidationResult, Velocity};

/// Damping and frequency of one tracked mode at one velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSample {
    /// g <= 0 stable, g > 0 unstable
    pub damping: f64,
    pub frequency: Frequency,
}

/// One velocity of a sweep. `modes` is `None` for a gap (step that failed to solve).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepPoint {
    pub velocity: Velocity,
    pub modes: Option<Vec<ModeSample>>,
}

impl SweepPoint {
    pub fn valid(velocity: Velocity, modes: Vec<ModeSample>) -> Self {
        Self {
            velocity,
            modes: Some(modes),
        }
    }

    pub fn gap(velocity: Velocity) -> Self {
        Self {
            velocity,
            modes: None,
        }
    }

    pub fn is_gap(&self) -> bool {
        self.modes.is_none()
    }

    pub fn mode(&self, index: usize) -> Option<&ModeSample> {
        self.modes.as_ref().and_then(|m| m.get(index))
    }
}

/// Where a sweep came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SweepSource {
    Internal,
    External,
}

/// Sweep points ordered by strictly increasing velocity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sweep {
    source: SweepSource,
    points: Vec<SweepPoint>,
}

impl Sweep {
    /// Validates ordering, finiteness and a consistent mode count across valid points.
    pub fn new(source: SweepSource, points: Vec<SweepPoint>) -> ValidationResult<Self> {
        let mut mode_count = None;
        for (i, point) in points.iter().enumerate() {
            crate::ensure_finite(point.velocity.value, "sweep velocity")?;
            if i > 0 && point.velocity.value <= points[i - 1].velocity.value {
                return Err(ValidationError::Inconsistent {
                    what: format!(
                        "sweep velocities must increase strictly (point {i}: {} after {})",
                        point.velocity.value,
                        points[i - 1].velocity.value
                    ),
                });
            }
            let Some(modes) = &point.modes else {
                continue;
            };
            for sample in modes {
                crate::ensure_finite(sample.damping, "sweep damping")?;
                crate::ensure_finite(sample.frequency.value, "sweep frequency")?;
            }
            match mode_count {
                None => mode_count = Some(modes.len()),
                Some(n) if n != modes.len() => {
                    return Err(ValidationError::Inconsistent {
                        what: format!(
                            "point {i} has {} modes, expected {n}",
                            modes.len()
                        ),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(Self { source, points })
    }

    pub fn source(&self) -> SweepSource {
        self.source
    }

    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of tracked modes (0 when every point is a gap).
    pub fn mode_count(&self) -> usize {
        self.points
            .iter()
            .find_map(|p| p.modes.as_ref().map(Vec::len))
            .unwrap_or(0)
    }

    pub fn gap_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_gap()).count()
    }

    /// `(point index, velocity m/s, sample)` for one mode across the valid points.
    pub fn mode_curve(&self, mode: usize) -> Vec<(usize, f64, ModeSample)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.mode(mode).map(|s| (i, p.velocity.value, *s)))
            .collect()
    }

    pub fn into_points(self) -> Vec<SweepPoint> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hz, mps};

    fn sample(g: f64, f: f64) -> ModeSample {
        ModeSample {
            damping: g,
            frequency: hz(f),
        }
    }

    #[test]
    fn rejects_unordered_velocities() {
        let points = vec![
            SweepPoint::valid(mps(200.0), vec![sample(-0.01, 70.0)]),
            SweepPoint::valid(mps(100.0), vec![sample(-0.01, 70.0)]),
        ];
        assert!(Sweep::new(SweepSource::Internal, points).is_err());
    }

    #[test]
    fn rejects_inconsistent_mode_counts() {
        let points = vec![
            SweepPoint::valid(mps(100.0), vec![sample(-0.01, 70.0)]),
            SweepPoint::valid(mps(200.0), vec![sample(-0.01, 70.0), sample(-0.02, 90.0)]),
        ];
        assert!(Sweep::new(SweepSource::External, points).is_err());
    }

    #[test]
    fn mode_curve_skips_gaps() {
        let points = vec![
            SweepPoint::valid(mps(100.0), vec![sample(-0.01, 70.0)]),
            SweepPoint::gap(mps(150.0)),
            SweepPoint::valid(mps(200.0), vec![sample(-0.02, 71.0)]),
        ];
        let sweep = Sweep::new(SweepSource::Internal, points).unwrap();
        let curve = sweep.mode_curve(0);
        assert_eq!(curve.len(), 2);
        assert_eq!(curve[1].0, 2);
        assert_eq!(sweep.gap_count(), 1);
        assert_eq!(sweep.mode_count(), 1);
    }
}
