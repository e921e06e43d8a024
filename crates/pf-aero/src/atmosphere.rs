//! ISA standard atmosphere, 0 to 47 km geopotential altitude.

use pf_core::{Density, Length, ValidationError, ValidationResult, Velocity, kg_per_m3, mps};

const G0: f64 = 9.806_65;
/// Specific gas constant for dry air, J/(kg*K)
const R_AIR: f64 = 287.052_87;
const GAMMA: f64 = 1.4;
const MAX_ALTITUDE: f64 = 47_000.0;

struct Layer {
    base_altitude: f64,
    base_temperature: f64,
    base_pressure: f64,
    /// K/m
    lapse_rate: f64,
}

const LAYERS: &[Layer] = &[
    // Troposphere
    Layer {
        base_altitude: 0.0,
        base_temperature: 288.15,
        base_pressure: 101_325.0,
        lapse_rate: -0.0065,
    },
    // Tropopause
    Layer {
        base_altitude: 11_000.0,
        base_temperature: 216.65,
        base_pressure: 22_632.06,
        lapse_rate: 0.0,
    },
    // Stratosphere 1
    Layer {
        base_altitude: 20_000.0,
        base_temperature: 216.65,
        base_pressure: 5_474.889,
        lapse_rate: 0.001,
    },
    // Stratosphere 2
    Layer {
        base_altitude: 32_000.0,
        base_temperature: 228.65,
        base_pressure: 868.0187,
        lapse_rate: 0.0028,
    },
];

/// Standard-day conditions at one altitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtmosphereState {
    pub altitude: Length,
    /// K
    pub temperature: f64,
    /// Pa
    pub pressure: f64,
    pub density: Density,
    pub speed_of_sound: Velocity,
}

/// Conditions at `altitude`. Altitudes outside 0..47 km are rejected, not clamped.
pub fn standard_atmosphere(altitude: Length) -> ValidationResult<AtmosphereState> {
    let h = altitude.value;
    if !(0.0..=MAX_ALTITUDE).contains(&h) {
        return Err(ValidationError::OutOfRange {
            what: "altitude",
            value: h,
            min: 0.0,
            max: MAX_ALTITUDE,
        });
    }

    let layer = LAYERS
        .iter()
        .rev()
        .find(|layer| h >= layer.base_altitude)
        .unwrap_or(&LAYERS[0]);
    let dh = h - layer.base_altitude;
    let temperature = layer.base_temperature + layer.lapse_rate * dh;
    let pressure = if layer.lapse_rate == 0.0 {
        layer.base_pressure * (-G0 * dh / (R_AIR * layer.base_temperature)).exp()
    } else {
        layer.base_pressure
            * (temperature / layer.base_temperature).powf(-G0 / (layer.lapse_rate * R_AIR))
    };

    Ok(AtmosphereState {
        altitude,
        temperature,
        pressure,
        density: kg_per_m3(pressure / (R_AIR * temperature)),
        speed_of_sound: mps((GAMMA * R_AIR * temperature).sqrt()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::m;

    #[test]
    fn sea_level() {
        let s = standard_atmosphere(m(0.0)).unwrap();
        assert!((s.density.value - 1.225).abs() < 1e-3);
        assert!((s.speed_of_sound.value - 340.294).abs() < 1e-2);
    }

    #[test]
    fn tropopause() {
        let s = standard_atmosphere(m(11_000.0)).unwrap();
        assert!((s.density.value - 0.3639).abs() < 1e-3);
        assert!((s.speed_of_sound.value - 295.07).abs() < 1e-2);
        assert!((s.temperature - 216.65).abs() < 1e-9);
    }

    #[test]
    fn layers_are_continuous() {
        for base in [11_000.0, 20_000.0, 32_000.0] {
            let below = standard_atmosphere(m(base - 1e-3)).unwrap();
            let above = standard_atmosphere(m(base)).unwrap();
            assert!((below.pressure - above.pressure).abs() / above.pressure < 1e-4);
            assert!((below.temperature - above.temperature).abs() < 1e-4);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(standard_atmosphere(m(-10.0)).is_err());
        assert!(standard_atmosphere(m(60_000.0)).is_err());
    }
}
