use serde::Deserialize;
use std::{f64::consts::PI, fmt, ops::Add};
use strum_macros::{Display, EnumIter, EnumString};

/// Angular units
#[derive(Debug, Clone, Copy, PartialEq, Default, EnumIter, EnumString, Display, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(try_from = "String")]
pub enum AngleUnit {
    #[strum(serialize = "radians", serialize = "rad")]
    Radians,
    #[strum(serialize = "degrees", serialize = "deg")]
    Degrees,
    Hours,
    Arcmin,
    #[default]
    Arcsec,
}
impl AngleUnit {
    /// The size of one unit in radians
    pub fn value(&self) -> f64 {
        match self {
            AngleUnit::Radians => 1f64,
            AngleUnit::Degrees => PI / 180.,
            AngleUnit::Hours => PI / 12.,
            AngleUnit::Arcmin => PI / 180. / 60.,
            AngleUnit::Arcsec => PI / 180. / 3600.,
        }
    }
}
impl TryFrom<String> for AngleUnit {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.to_lowercase().parse()
    }
}

/// An angle, stored in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);
impl Angle {
    pub fn from_radians(value: f64) -> Self {
        Self(value)
    }
    pub fn from_degrees(value: f64) -> Self {
        Self(value.to_radians())
    }
    pub fn new(value: f64, unit: AngleUnit) -> Self {
        Self(value * unit.value())
    }
    pub fn rad(&self) -> f64 {
        self.0
    }
    pub fn deg(&self) -> f64 {
        self.0.to_degrees()
    }
    /// Returns the angle in the given unit
    pub fn to(&self, unit: AngleUnit) -> f64 {
        self.0 / unit.value()
    }
    pub fn sincos(&self) -> (f64, f64) {
        self.0.sin_cos()
    }
    /// Wraps the angle into [-π,π)
    pub fn wrap(&self) -> Self {
        Self((self.0 + PI).rem_euclid(2. * PI) - PI)
    }
}
impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Self) -> Self::Output {
        Angle(self.0 + rhs.0)
    }
}
impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}deg", self.deg())
    }
}
