//! Free-stream flow state.

use pf_core::{
    Density, Length, ValidationError, ValidationResult, Velocity, ensure_finite, ensure_positive,
};
use serde::{Deserialize, Serialize};

use crate::atmosphere::standard_atmosphere;

/// Free stream seen by the panel at one sweep point.
///
/// Mach number is carried independently of `velocity`: a sweep holds the Mach
/// number of its template fixed while the velocity varies. Regime is derived from
/// `mach` on demand and never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    pub mach: f64,
    pub density: Density,
    pub speed_of_sound: Velocity,
    pub velocity: Velocity,
    /// Set when density and speed of sound came from the standard atmosphere.
    #[serde(default)]
    pub altitude: Option<Length>,
}

impl FlowState {
    pub fn new(
        mach: f64,
        density: Density,
        speed_of_sound: Velocity,
        velocity: Velocity,
    ) -> ValidationResult<Self> {
        let flow = Self {
            mach,
            density,
            speed_of_sound,
            velocity,
            altitude: None,
        };
        flow.validate()?;
        Ok(flow)
    }

    /// Density and speed of sound from the ISA at `altitude`.
    pub fn standard_atmosphere(
        altitude: Length,
        mach: f64,
        velocity: Velocity,
    ) -> ValidationResult<Self> {
        let atm = standard_atmosphere(altitude)?;
        let mut flow = Self::new(mach, atm.density, atm.speed_of_sound, velocity)?;
        flow.altitude = Some(altitude);
        Ok(flow)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        ensure_finite(self.mach, "Mach number")?;
        if self.mach < 0.0 {
            return Err(ValidationError::OutOfRange {
                what: "Mach number",
                value: self.mach,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        ensure_positive(self.density.value, "free-stream density")?;
        ensure_positive(self.speed_of_sound.value, "speed of sound")?;
        ensure_finite(self.velocity.value, "free-stream velocity")?;
        if self.velocity.value < 0.0 {
            return Err(ValidationError::NonPositive {
                what: "free-stream velocity",
                value: self.velocity.value,
            });
        }
        Ok(())
    }

    /// Same free stream at another velocity.
    pub fn with_velocity(&self, velocity: Velocity) -> Self {
        Self {
            velocity,
            ..self.clone()
        }
    }

    /// q = 0.5 rho V^2, Pa
    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.density.value * self.velocity.value.powi(2)
    }

    /// sqrt(|M^2 - 1|): Prandtl-Glauert factor below Mach 1, supersonic factor above.
    pub fn beta(&self) -> f64 {
        (self.mach * self.mach - 1.0).abs().sqrt()
    }

    /// Velocity consistent with the Mach number, M * a.
    pub fn mach_velocity(&self) -> Velocity {
        self.speed_of_sound * self.mach
    }
}
