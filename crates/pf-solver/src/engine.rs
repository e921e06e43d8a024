//! Velocity sweep execution.
//!
//! For velocity-independent root selection (piston theory) steps are
//! independent, so each batch of velocities is solved in parallel and mode
//! continuation runs afterwards as a sequential pass in velocity order. The p-k
//! path continues each mode from its root at the previous valid step, so steps
//! run in velocity order and the modes of one step are solved in parallel. A step
//! that fails to solve becomes a gap; too many consecutive gaps abort the sweep.

use nalgebra::Complex;
use pf_aero::{AerodynamicTheory, FlowState};
use pf_core::{
    AeroTheory, Approximation, ModeSample, Sweep, SweepPoint, SweepSource, ValidationError,
    ValidationResult, ensure_finite, hz, mps,
};
use pf_structures::ModalAnalysis;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::eigen::{EigenConfig, ModalSystem, damping_ratio, frequency_hz, mode_roots};
use crate::error::{SweepError, SweepResult};
use crate::pk::{PkConfig, solve_pk_modes};
use crate::plan::SweepPlan;
use crate::tracking::track;

/// Sweep configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepOptions {
    /// Uniform structural damping coefficient g_s
    pub structural_damping: f64,
    /// Lowest modes reported per point; all modes when unset
    pub tracked_modes: Option<usize>,
    pub pk: PkConfig,
    pub eigen: EigenConfig,
    pub max_consecutive_gaps: usize,
    /// Velocities solved per batch when a stop predicate is supplied
    pub batch_size: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            structural_damping: 0.0,
            tracked_modes: None,
            pk: PkConfig::default(),
            eigen: EigenConfig::default(),
            max_consecutive_gaps: 3,
            batch_size: 8,
        }
    }
}

impl SweepOptions {
    /// Validates against a mode set and returns the tracked mode count.
    pub fn validate(&self, mode_count: usize) -> ValidationResult<usize> {
        ensure_finite(self.structural_damping, "structural damping")?;
        if self.structural_damping < 0.0 {
            return Err(ValidationError::OutOfRange {
                what: "structural damping",
                value: self.structural_damping,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        let tracked = self.tracked_modes.unwrap_or(mode_count);
        if tracked == 0 || tracked > mode_count {
            return Err(ValidationError::OutOfRange {
                what: "tracked modes",
                value: tracked as f64,
                min: 1.0,
                max: mode_count as f64,
            });
        }
        if self.pk.tolerance <= 0.0 || self.pk.max_iterations == 0 {
            return Err(ValidationError::Inconsistent {
                what: "p-k iteration needs a positive tolerance and at least one iteration"
                    .to_string(),
            });
        }
        if self.max_consecutive_gaps == 0 || self.batch_size == 0 {
            return Err(ValidationError::Inconsistent {
                what: "gap limit and batch size must be at least 1".to_string(),
            });
        }
        Ok(tracked)
    }
}

/// Result of one sweep run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub sweep: Sweep,
    pub theory: AeroTheory,
    pub approximations: Vec<Approximation>,
    /// True when a stop predicate ended the sweep before the range end
    pub terminated_early: bool,
    /// Points added by adaptive refinement
    pub refined_points: usize,
}

type RawStep = (f64, Option<Vec<Complex<f64>>>);

/// Sweeps one mode set and aerodynamic theory over velocity at a fixed flow template.
///
/// The template's Mach number, density and speed of sound hold for every point;
/// only the velocity varies.
pub struct SweepEngine<'a> {
    theory: &'a dyn AerodynamicTheory,
    template: FlowState,
    options: SweepOptions,
    system: ModalSystem,
    tracked: usize,
}

impl<'a> SweepEngine<'a> {
    pub fn new(
        modal: &ModalAnalysis,
        theory: &'a dyn AerodynamicTheory,
        template: FlowState,
        options: SweepOptions,
    ) -> SweepResult<Self> {
        template.validate()?;
        let tracked = options.validate(modal.len())?;
        let system = ModalSystem::new(modal, options.structural_damping)?;
        Ok(Self {
            theory,
            template,
            options,
            system,
            tracked,
        })
    }

    pub fn tracked_modes(&self) -> usize {
        self.tracked
    }

    /// Roots of the tracked modes at one velocity, p-k modes continued from
    /// their still-air roots.
    pub fn solve_step(&self, velocity: f64) -> SweepResult<Vec<Complex<f64>>> {
        self.solve_step_from(velocity, &self.system.natural_roots(self.tracked))
    }

    /// Roots of the tracked modes at one velocity.
    ///
    /// Under frequency-dependent aerodynamics slot `r` continues `seeds[r]`.
    /// Otherwise the seeds are unused and the roots come back unlabelled, lowest
    /// first.
    pub fn solve_step_from(
        &self,
        velocity: f64,
        seeds: &[Complex<f64>],
    ) -> SweepResult<Vec<Complex<f64>>> {
        let flow = self.template.with_velocity(mps(velocity));
        flow.validate()?;

        if self.theory.is_frequency_dependent() {
            return solve_pk_modes(
                &self.system,
                self.theory,
                &flow,
                seeds,
                &self.options.pk,
                &self.options.eigen,
            );
        }

        let aero = self.theory.contribution(&flow, 0.0)?;
        let roots = self
            .system
            .roots(&aero, &self.options.eigen)?
            .ok_or_else(|| SweepError::StepFailed {
                velocity,
                what: "eigen-solve did not converge".to_string(),
            })?;
        let mut modes = mode_roots(&roots);
        if modes.len() < self.tracked {
            return Err(SweepError::StepFailed {
                velocity,
                what: format!("{} roots for {} tracked modes", modes.len(), self.tracked),
            });
        }
        modes.sort_by(|a, b| a.norm().total_cmp(&b.norm()));
        modes.truncate(self.tracked);
        Ok(modes)
    }

    /// Sweep the whole plan.
    pub fn run(&self, plan: &SweepPlan) -> SweepResult<SweepOutcome> {
        self.execute(plan, None)
    }

    /// Sweep in velocity-ordered batches, stopping after the first batch for which
    /// `stop` holds on the labelled prefix.
    pub fn run_until<F>(&self, plan: &SweepPlan, stop: F) -> SweepResult<SweepOutcome>
    where
        F: Fn(&Sweep) -> bool,
    {
        self.execute(plan, Some(&stop))
    }

    fn execute(
        &self,
        plan: &SweepPlan,
        stop: Option<&dyn Fn(&Sweep) -> bool>,
    ) -> SweepResult<SweepOutcome> {
        plan.validate()?;
        let grid = plan.grid();
        info!(
            theory = %self.theory.theory(),
            mach = self.template.mach,
            points = grid.len(),
            tracked = self.tracked,
            policy = %plan.policy,
            "Starting velocity sweep"
        );

        let mut raw: Vec<RawStep> = Vec::with_capacity(grid.len());
        let mut terminated_early = false;
        match stop {
            None => {
                raw = self.compute(&[], &grid)?;
                self.check_gaps(&raw)?;
            }
            Some(stop) => {
                for batch in grid.chunks(self.options.batch_size) {
                    let solved = self.compute(&raw, batch)?;
                    raw.extend(solved);
                    self.check_gaps(&raw)?;
                    let prefix = self.assemble(&raw)?;
                    if stop(&prefix) {
                        let last = raw.last().map_or(0.0, |step| step.0);
                        if last < plan.range.max.value {
                            info!(velocity = last, "Stop condition met, ending sweep early");
                            terminated_early = true;
                        }
                        break;
                    }
                }
            }
        }

        let refined_points = match plan.refinement_floor() {
            Some(floor) => self.refine(&mut raw, floor)?,
            None => 0,
        };

        let sweep = self.assemble(&raw)?;
        info!(
            points = sweep.len(),
            gaps = sweep.gap_count(),
            refined_points,
            "Velocity sweep complete"
        );

        let mut approximations = self.theory.approximations();
        if self.options.structural_damping > 0.0 {
            approximations.push(Approximation::StructuralDamping {
                g: self.options.structural_damping,
            });
        }
        Ok(SweepOutcome {
            sweep,
            theory: self.theory.theory(),
            approximations,
            terminated_early,
            refined_points,
        })
    }

    /// Solve `velocities` (increasing) given the steps already in `known`
    /// (sorted by velocity).
    fn compute(&self, known: &[RawStep], velocities: &[f64]) -> SweepResult<Vec<RawStep>> {
        let results: Vec<(f64, SweepResult<Vec<Complex<f64>>>)> =
            if self.theory.is_frequency_dependent() {
                let mut steps = known.to_vec();
                let mut results = Vec::with_capacity(velocities.len());
                for &v in velocities {
                    let seeds = self.seeds_below(&steps, v);
                    let result = self.solve_step_from(v, &seeds);
                    let roots = result.as_ref().ok().cloned();
                    steps.insert(steps.partition_point(|s| s.0 < v), (v, roots));
                    results.push((v, result));
                }
                results
            } else {
                velocities
                    .par_iter()
                    .map(|&v| (v, self.solve_step_from(v, &[])))
                    .collect()
            };

        results
            .into_iter()
            .map(|(velocity, result)| match result {
                Ok(roots) => Ok((velocity, Some(roots))),
                Err(e) if e.is_step_failure() => {
                    warn!(velocity, error = %e, "Velocity step recorded as gap");
                    Ok((velocity, None))
                }
                Err(e) => Err(e),
            })
            .collect()
    }

    /// Roots of the last valid step below `velocity`, or the still-air roots.
    fn seeds_below(&self, steps: &[RawStep], velocity: f64) -> Vec<Complex<f64>> {
        steps
            .iter()
            .rev()
            .filter(|(v, _)| *v < velocity)
            .find_map(|(_, roots)| roots.clone())
            .unwrap_or_else(|| self.system.natural_roots(self.tracked))
    }

    /// Slot labels per step. p-k steps are labelled by continuation already.
    fn label(&self, raw: &[RawStep]) -> Vec<Option<Vec<Complex<f64>>>> {
        let steps: Vec<Option<Vec<Complex<f64>>>> =
            raw.iter().map(|(_, roots)| roots.clone()).collect();
        if self.theory.is_frequency_dependent() {
            steps
        } else {
            track(&steps)
        }
    }

    fn check_gaps(&self, raw: &[RawStep]) -> SweepResult<()> {
        let mut run = 0;
        for (velocity, roots) in raw {
            if roots.is_some() {
                run = 0;
                continue;
            }
            run += 1;
            if run >= self.options.max_consecutive_gaps {
                return Err(SweepError::Convergence {
                    velocity: *velocity,
                    consecutive_gaps: run,
                });
            }
        }
        Ok(())
    }

    fn assemble(&self, raw: &[RawStep]) -> SweepResult<Sweep> {
        let points = raw
            .iter()
            .zip(self.label(raw))
            .map(|((velocity, _), roots)| match roots {
                Some(roots) => SweepPoint::valid(
                    mps(*velocity),
                    roots
                        .iter()
                        .map(|p| ModeSample {
                            damping: damping_ratio(*p),
                            frequency: hz(frequency_hz(*p)),
                        })
                        .collect(),
                ),
                None => SweepPoint::gap(mps(*velocity)),
            })
            .collect();
        Ok(Sweep::new(SweepSource::Internal, points)?)
    }

    /// Bisect intervals where any tracked damping changes sign until the halves
    /// would drop below `floor`. Returns the number of points added.
    fn refine(&self, raw: &mut Vec<RawStep>, floor: f64) -> SweepResult<usize> {
        let mut added = 0;
        loop {
            let tracked = self.label(raw.as_slice());
            let midpoints: Vec<f64> = raw
                .windows(2)
                .zip(tracked.windows(2))
                .filter_map(|(v, t)| {
                    let (v0, v1) = (v[0].0, v[1].0);
                    let (Some(a), Some(b)) = (&t[0], &t[1]) else {
                        return None;
                    };
                    let sign_change = a
                        .iter()
                        .zip(b)
                        .any(|(pa, pb)| (damping_ratio(*pa) > 0.0) != (damping_ratio(*pb) > 0.0));
                    (sign_change && 0.5 * (v1 - v0) >= floor).then_some(0.5 * (v0 + v1))
                })
                .collect();
            if midpoints.is_empty() {
                return Ok(added);
            }

            debug!(count = midpoints.len(), "Refining sweep around damping sign changes");
            let extra = self.compute(raw.as_slice(), &midpoints)?;
            added += extra.len();
            raw.extend(extra);
            raw.sort_by(|a, b| a.0.total_cmp(&b.0));
            self.check_gaps(raw)?;
        }
    }
}
