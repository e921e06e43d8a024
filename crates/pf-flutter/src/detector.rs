//! Flutter onset detector.
//!
//! Per tracked mode, over valid points in velocity order (gaps are bridged):
//!
//! 1. A candidate is the first point whose damping exceeds the noise threshold
//!    after at least one point with damping at or below zero.
//! 2. With confirmation on, the next valid point must also exceed the threshold.
//!    A candidate that drops back is a rejected spike and the scan continues.
//! 3. The critical velocity is the zero-damping crossing between the last point
//!    with damping at or below zero and the point after it. The critical
//!    frequency is interpolated at the same fraction.
//!
//! The reported onset is the lowest critical velocity over all modes, ties going
//! to the lower mode index.

use pf_core::{
    Frequency, ModeSample, Sweep, SweepSource, ValidationError, Velocity, ensure_finite, hz,
    lerp, mps, zero_crossing,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DetectResult;

/// Damping at or below this is numerical noise, not physical instability.
///
/// Set empirically from converged sweeps of stable panels, where residual
/// positive damping stayed an order of magnitude below it. A previous threshold
/// of 0.0001 flagged that residue as flutter.
pub const DAMPING_NOISE_THRESHOLD: f64 = 0.001;

/// Detector settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub threshold: f64,
    /// Require the point after a candidate to exceed the threshold too
    pub require_confirmation: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: DAMPING_NOISE_THRESHOLD,
            require_confirmation: true,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> DetectResult<()> {
        ensure_finite(self.threshold, "damping noise threshold")?;
        if self.threshold < 0.0 {
            return Err(ValidationError::OutOfRange {
                what: "damping noise threshold",
                value: self.threshold,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        Ok(())
    }
}

/// A confirmed flutter onset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlutterOnset {
    pub critical_velocity: Velocity,
    pub critical_frequency: Frequency,
    /// Tracked mode slot
    pub mode: usize,
    /// Sweep index of the first point above the threshold
    pub source_point: usize,
    /// Sweep indices of the two points the crossing was interpolated between
    pub bracket: (usize, usize),
}

/// Detector verdict. `NoFlutterInRange` is an outcome, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum FlutterResult {
    FlutterFound(FlutterOnset),
    NoFlutterInRange,
}

impl FlutterResult {
    pub fn onset(&self) -> Option<&FlutterOnset> {
        match self {
            FlutterResult::FlutterFound(onset) => Some(onset),
            FlutterResult::NoFlutterInRange => None,
        }
    }

    pub fn is_flutter(&self) -> bool {
        self.onset().is_some()
    }
}

/// Observations that did not produce an onset but matter to a reviewer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Single point above the threshold that dropped back at the next point
    RejectedSpike {
        mode: usize,
        velocity: Velocity,
        damping: f64,
    },
    /// Candidate at the last valid point, with nothing left to confirm it
    UnconfirmedAtEnd {
        mode: usize,
        velocity: Velocity,
        damping: f64,
    },
    /// Mode already above the threshold at its first valid point
    UnstableAtStart {
        mode: usize,
        velocity: Velocity,
        damping: f64,
    },
}

/// Verdict plus diagnostics for one sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlutterReport {
    pub result: FlutterResult,
    pub diagnostics: Vec<Diagnostic>,
    pub threshold: f64,
    pub source: SweepSource,
}

pub fn detect(sweep: &Sweep, config: &DetectorConfig) -> DetectResult<FlutterReport> {
    config.validate()?;
    let mut diagnostics = Vec::new();
    let mut best: Option<FlutterOnset> = None;

    for mode in 0..sweep.mode_count() {
        let curve = sweep.mode_curve(mode);
        let Some(onset) = scan_mode(&curve, mode, config, &mut diagnostics) else {
            continue;
        };
        // strict comparison keeps the lower mode on equal velocities
        if best.is_none_or(|b| onset.critical_velocity.value < b.critical_velocity.value) {
            best = Some(onset);
        }
    }

    for d in &diagnostics {
        debug!(?d, "Detector diagnostic");
    }
    let result = match best {
        Some(onset) => {
            info!(
                velocity = onset.critical_velocity.value,
                frequency = onset.critical_frequency.value,
                mode = onset.mode,
                "Flutter onset found"
            );
            FlutterResult::FlutterFound(onset)
        }
        None => {
            info!(points = sweep.len(), "No flutter in range");
            FlutterResult::NoFlutterInRange
        }
    };
    Ok(FlutterReport {
        result,
        diagnostics,
        threshold: config.threshold,
        source: sweep.source(),
    })
}

fn scan_mode(
    curve: &[(usize, f64, ModeSample)],
    mode: usize,
    config: &DetectorConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<FlutterOnset> {
    let threshold = config.threshold;
    let (_, v0, first) = curve.first()?;
    if first.damping > threshold {
        diagnostics.push(Diagnostic::UnstableAtStart {
            mode,
            velocity: mps(*v0),
            damping: first.damping,
        });
    }

    let mut last_stable: Option<usize> = None;
    for (k, (_, velocity, sample)) in curve.iter().enumerate() {
        if sample.damping <= 0.0 {
            last_stable = Some(k);
            continue;
        }
        if sample.damping <= threshold {
            continue;
        }
        let Some(j) = last_stable else {
            continue;
        };

        if config.require_confirmation {
            match curve.get(k + 1) {
                None => {
                    diagnostics.push(Diagnostic::UnconfirmedAtEnd {
                        mode,
                        velocity: mps(*velocity),
                        damping: sample.damping,
                    });
                    return None;
                }
                Some((_, _, next)) if next.damping <= threshold => {
                    diagnostics.push(Diagnostic::RejectedSpike {
                        mode,
                        velocity: mps(*velocity),
                        damping: sample.damping,
                    });
                    continue;
                }
                Some(_) => {}
            }
        }

        return Some(interpolate(curve, j, k, mode));
    }
    None
}

/// Crossing between curve positions `j` (damping <= 0) and `j + 1` (damping > 0).
fn interpolate(
    curve: &[(usize, f64, ModeSample)],
    j: usize,
    k: usize,
    mode: usize,
) -> FlutterOnset {
    let (ia, va, a) = curve[j];
    let (ib, vb, b) = curve[j + 1];
    let velocity = zero_crossing(va, a.damping, vb, b.damping).unwrap_or(va);
    let frequency = lerp(va, a.frequency.value, vb, b.frequency.value, velocity);
    FlutterOnset {
        critical_velocity: mps(velocity),
        critical_frequency: hz(frequency),
        mode,
        source_point: curve[k].0,
        bracket: (ia, ib),
    }
}

/// Stop predicate for an early-terminating sweep: true once an onset is confirmed.
pub fn stop_on_flutter(config: DetectorConfig) -> impl Fn(&Sweep) -> bool {
    move |sweep| detect(sweep, &config).is_ok_and(|report| report.result.is_flutter())
}
