// pf-core/src/units.rs

use std::fmt;
use std::str::FromStr;

use uom::si::f64::{
    Frequency as UomFrequency, Length as UomLength, MassDensity as UomMassDensity,
    Pressure as UomPressure, Ratio as UomRatio, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Frequency = UomFrequency;
pub type Length = UomLength;
pub type Density = UomMassDensity;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Velocity = UomVelocity;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn gpa(v: f64) -> Pressure {
    use uom::si::pressure::gigapascal;
    Pressure::new::<gigapascal>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Velocity units accepted from outside the pipeline.
///
/// `to_si` is the only place a raw velocity number is scaled. Everything past it
/// carries a [`Velocity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VelocityUnit {
    #[default]
    MetersPerSecond,
    CentimetersPerSecond,
    MillimetersPerSecond,
    InchesPerSecond,
    FeetPerSecond,
    Knots,
    KilometersPerHour,
}

impl VelocityUnit {
    pub fn to_si(self, value: f64) -> Velocity {
        use uom::si::velocity::{
            centimeter_per_second, foot_per_second, inch_per_second, kilometer_per_hour, knot,
            meter_per_second, millimeter_per_second,
        };
        match self {
            Self::MetersPerSecond => Velocity::new::<meter_per_second>(value),
            Self::CentimetersPerSecond => Velocity::new::<centimeter_per_second>(value),
            Self::MillimetersPerSecond => Velocity::new::<millimeter_per_second>(value),
            Self::InchesPerSecond => Velocity::new::<inch_per_second>(value),
            Self::FeetPerSecond => Velocity::new::<foot_per_second>(value),
            Self::Knots => Velocity::new::<knot>(value),
            Self::KilometersPerHour => Velocity::new::<kilometer_per_hour>(value),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::MetersPerSecond => "m/s",
            Self::CentimetersPerSecond => "cm/s",
            Self::MillimetersPerSecond => "mm/s",
            Self::InchesPerSecond => "in/s",
            Self::FeetPerSecond => "ft/s",
            Self::Knots => "kn",
            Self::KilometersPerHour => "km/h",
        }
    }
}

impl fmt::Display for VelocityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for VelocityUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m/s" | "mps" => Ok(Self::MetersPerSecond),
            "cm/s" => Ok(Self::CentimetersPerSecond),
            "mm/s" => Ok(Self::MillimetersPerSecond),
            "in/s" | "ips" => Ok(Self::InchesPerSecond),
            "ft/s" | "fps" => Ok(Self::FeetPerSecond),
            "kn" | "kt" | "knots" => Ok(Self::Knots),
            "km/h" | "kph" => Ok(Self::KilometersPerHour),
            other => Err(format!("unknown velocity unit '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _l = m(0.5);
        let _t = mm(3.0);
        let _e = gpa(71.7);
        let _rho = kg_per_m3(2810.0);
        let _v = mps(100.0);
        let _f = hz(74.6);
        let _r = unitless(0.3);
    }

    #[test]
    fn gpa_is_stored_in_pascal() {
        assert!((gpa(71.7).value - 71.7e9).abs() < 1.0);
        assert!((mm(3.0).value - 0.003).abs() < 1e-15);
    }

    #[test]
    fn velocity_units_convert_once() {
        assert!((VelocityUnit::MillimetersPerSecond.to_si(250_000.0).value - 250.0).abs() < 1e-9);
        assert!((VelocityUnit::CentimetersPerSecond.to_si(100.0).value - 1.0).abs() < 1e-12);
        assert!((VelocityUnit::FeetPerSecond.to_si(1.0).value - 0.3048).abs() < 1e-12);
        assert!((VelocityUnit::Knots.to_si(1.0).value - 1852.0 / 3600.0).abs() < 1e-9);
        assert!((VelocityUnit::MetersPerSecond.to_si(42.0).value - 42.0).abs() < 1e-12);
    }

    #[test]
    fn unit_parses_from_symbol() {
        for unit in [
            VelocityUnit::MetersPerSecond,
            VelocityUnit::CentimetersPerSecond,
            VelocityUnit::MillimetersPerSecond,
            VelocityUnit::InchesPerSecond,
            VelocityUnit::FeetPerSecond,
            VelocityUnit::Knots,
            VelocityUnit::KilometersPerHour,
        ] {
            assert_eq!(unit.symbol().parse::<VelocityUnit>(), Ok(unit));
        }
        assert!("furlong/fortnight".parse::<VelocityUnit>().is_err());
    }
}
