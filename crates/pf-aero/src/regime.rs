//! Aerodynamic regime decision.
//!
//! A pure function of Mach number:
//!
//! - `M < subsonic_limit`: subsonic lattice
//! - `subsonic_limit <= M < piston_min_mach`: rejected, neither theory is validated
//! - `M >= piston_min_mach`: piston theory

use pf_core::{AeroTheory, Approximation, ValidationError, ensure_finite};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AeroError, AeroResult};

/// Bounds of the excluded transonic band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    pub subsonic_limit: f64,
    /// Lower bound of piston theory validity
    pub piston_min_mach: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            subsonic_limit: 1.0,
            piston_min_mach: 1.2,
        }
    }
}

impl RegimeConfig {
    pub fn validate(&self) -> AeroResult<()> {
        ensure_finite(self.subsonic_limit, "subsonic limit")?;
        ensure_finite(self.piston_min_mach, "piston lower Mach bound")?;
        if !(self.subsonic_limit > 0.0
            && self.subsonic_limit <= 1.0
            && self.piston_min_mach >= 1.0)
        {
            return Err(ValidationError::Inconsistent {
                what: format!(
                    "regime bounds need 0 < subsonic limit ({}) <= 1 <= piston bound ({})",
                    self.subsonic_limit, self.piston_min_mach
                ),
            }
            .into());
        }
        Ok(())
    }
}

/// Which theory was chosen, and from what.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegimeDecision {
    pub theory: AeroTheory,
    pub mach: f64,
    pub subsonic_limit: f64,
    pub piston_min_mach: f64,
}

impl RegimeDecision {
    pub fn approximation(&self) -> Approximation {
        Approximation::RegimeSelection {
            theory: self.theory,
            mach: self.mach,
        }
    }
}

pub fn select_regime(mach: f64, config: &RegimeConfig) -> AeroResult<RegimeDecision> {
    config.validate()?;
    ensure_finite(mach, "Mach number")?;
    if mach < 0.0 {
        return Err(ValidationError::OutOfRange {
            what: "Mach number",
            value: mach,
            min: 0.0,
            max: f64::INFINITY,
        }
        .into());
    }

    let theory = if mach < config.subsonic_limit {
        AeroTheory::SubsonicLattice
    } else if mach >= config.piston_min_mach {
        AeroTheory::PistonTheory
    } else {
        return Err(AeroError::UnsupportedRegime {
            mach,
            lower: config.subsonic_limit,
            upper: config.piston_min_mach,
        });
    };

    info!(mach, %theory, "Selected aerodynamic theory");
    Ok(RegimeDecision {
        theory,
        mach,
        subsonic_limit: config.subsonic_limit,
        piston_min_mach: config.piston_min_mach,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theory(mach: f64) -> AeroResult<AeroTheory> {
        select_regime(mach, &RegimeConfig::default()).map(|d| d.theory)
    }

    #[test]
    fn just_below_transition_is_subsonic() {
        assert_eq!(theory(0.999).unwrap(), AeroTheory::SubsonicLattice);
        assert_eq!(theory(0.0).unwrap(), AeroTheory::SubsonicLattice);
    }

    #[test]
    fn at_and_above_piston_bound_is_piston() {
        assert_eq!(theory(1.2).unwrap(), AeroTheory::PistonTheory);
        assert_eq!(theory(3.5).unwrap(), AeroTheory::PistonTheory);
    }

    #[test]
    fn transonic_band_is_rejected() {
        for mach in [1.0, 1.1, 1.199_999] {
            assert!(matches!(
                theory(mach),
                Err(AeroError::UnsupportedRegime { .. })
            ));
        }
    }

    #[test]
    fn negative_mach_is_a_validation_error() {
        assert!(matches!(theory(-0.5), Err(AeroError::Validation(_))));
    }

    #[test]
    fn custom_bounds_widen_the_band() {
        let config = RegimeConfig {
            subsonic_limit: 0.9,
            piston_min_mach: 1.5,
        };
        assert!(select_regime(0.95, &config).is_err());
        assert!(select_regime(1.4, &config).is_err());
        assert_eq!(
            select_regime(1.5, &config).unwrap().theory,
            AeroTheory::PistonTheory
        );
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let config = RegimeConfig {
            subsonic_limit: 1.3,
            piston_min_mach: 1.2,
        };
        assert!(matches!(
            select_regime(0.5, &config),
            Err(AeroError::Validation(_))
        ));
    }

    #[test]
    fn decision_is_deterministic() {
        let a = select_regime(0.8, &RegimeConfig::default()).unwrap();
        let b = select_regime(0.8, &RegimeConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
