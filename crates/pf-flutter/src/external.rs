//! Import of externally parsed solver output.
//!
//! Records arrive as `(velocity, damping[], frequency_hz[])` in a caller-named
//! velocity unit. [`VelocityUnit::to_si`] is applied once here; the resulting
//! [`Sweep`] is in m/s like an internal one. A record with empty arrays is a
//! velocity the external solver did not converge at and becomes a gap.

use pf_core::{ModeSample, Sweep, SweepPoint, SweepSource, ValidationError, VelocityUnit, hz};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DetectResult;

/// One velocity of external solver output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub velocity: f64,
    #[serde(default)]
    pub damping: Vec<f64>,
    #[serde(default)]
    pub frequency_hz: Vec<f64>,
}

/// Parse a JSON array of records.
pub fn parse_records(json: &str) -> DetectResult<Vec<ExternalRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Convert records to a sweep. Records must already be in increasing velocity
/// order; they are validated, not sorted.
pub fn import_records(records: &[ExternalRecord], unit: VelocityUnit) -> DetectResult<Sweep> {
    let points = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            if record.damping.len() != record.frequency_hz.len() {
                return Err(ValidationError::Inconsistent {
                    what: format!(
                        "record {i} has {} damping values and {} frequencies",
                        record.damping.len(),
                        record.frequency_hz.len()
                    ),
                });
            }
            let velocity = unit.to_si(record.velocity);
            if record.damping.is_empty() {
                return Ok(SweepPoint::gap(velocity));
            }
            let modes = record
                .damping
                .iter()
                .zip(&record.frequency_hz)
                .map(|(&damping, &f)| ModeSample {
                    damping,
                    frequency: hz(f),
                })
                .collect();
            Ok(SweepPoint::valid(velocity, modes))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let sweep = Sweep::new(SweepSource::External, points)?;
    info!(
        records = sweep.len(),
        gaps = sweep.gap_count(),
        unit = %unit,
        "Imported external records"
    );
    Ok(sweep)
}
