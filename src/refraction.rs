//! Atmospheric refraction
//!
//! The air refractive index follows Filippenko (1982), PASP 94, 715,
//! itself based on Edlén (1953) and Coleman, Bozman & Meggers (1960).

use crate::angle::Angle;
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RefractionError {
    #[error("wavelength must be a positive number of nm, found {0}")]
    Wavelength(f64),
    #[error("zenith angle must be in [0,90[ degree, found {0}")]
    ZenithAngle(Angle),
    #[error("non-physical atmosphere: {0}")]
    Atmosphere(String),
}

type Result<T> = std::result::Result<T, RefractionError>;

/// Refraction model interface
///
/// Must be deterministic for a given wavelength and zenith angle.
pub trait RefractionModel: Send + Sync {
    /// Angular refraction in radians at `wavelength` \[nm\]
    fn refraction(&self, wavelength: f64, zenith_angle: Angle) -> Result<f64>;
}

/// Atmosphere conditions at the observatory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    /// Air pressure \[kPa\]
    pub pressure: f64,
    /// Air temperature \[K\]
    pub temperature: f64,
    /// Water vapor pressure \[kPa\]
    pub h2o_pressure: f64,
}
impl Default for Atmosphere {
    // Cerro Pachon like conditions
    fn default() -> Self {
        Self {
            pressure: 69.328,
            temperature: 293.15,
            h2o_pressure: 1.067,
        }
    }
}
impl Atmosphere {
    pub fn check(&self) -> Result<()> {
        if !(self.pressure.is_finite() && self.pressure > 0.) {
            return Err(RefractionError::Atmosphere(format!(
                "pressure={}kPa",
                self.pressure
            )));
        }
        if !(self.temperature.is_finite() && self.temperature > 0.) {
            return Err(RefractionError::Atmosphere(format!(
                "temperature={}K",
                self.temperature
            )));
        }
        if !(self.h2o_pressure.is_finite() && self.h2o_pressure >= 0.) {
            return Err(RefractionError::Atmosphere(format!(
                "H2O pressure={}kPa",
                self.h2o_pressure
            )));
        }
        Ok(())
    }
    /// Refractive index of air minus one at `wavelength` \[nm\]
    pub fn refractive_index_minus_one(&self, wavelength: f64) -> Result<f64> {
        if !(wavelength.is_finite() && wavelength > 0.) {
            return Err(RefractionError::Wavelength(wavelength));
        }
        self.check()?;
        // pressures in mmHg
        let p = self.pressure * 7.50062;
        let p_h2o = self.h2o_pressure * 7.50062;
        let t = self.temperature - 273.15;
        // inverse wavenumber squared [micron^-2]
        let sigma_sq = (1e3 / wavelength).powi(2);
        // dry air at 15C and 760mmHg
        let mut n_minus_one =
            (64.328 + 29498.1 / (146. - sigma_sq) + 255.4 / (41. - sigma_sq)) * 1e-6;
        n_minus_one *=
            p * (1. + (1.049 - 0.0157 * t) * 1e-6 * p) / (720.883 * (1. + 0.003661 * t));
        n_minus_one -= (0.0624 - 0.000680 * sigma_sq) / (1. + 0.003661 * t) * p_h2o * 1e-6;
        // the dispersion terms diverge at 1/sqrt(41) and 1/sqrt(146) micron
        if !n_minus_one.is_finite() {
            return Err(RefractionError::Wavelength(wavelength));
        }
        Ok(n_minus_one)
    }
}
impl RefractionModel for Atmosphere {
    fn refraction(&self, wavelength: f64, zenith_angle: Angle) -> Result<f64> {
        let z = zenith_angle.rad();
        if !(0f64..FRAC_PI_2).contains(&z) {
            return Err(RefractionError::ZenithAngle(zenith_angle));
        }
        let nm1 = self.refractive_index_minus_one(wavelength)?;
        // (n^2-1)/(2n^2) without cancellation
        let r0 = nm1 * (nm1 + 2.) / 2. / (nm1 * nm1 + 2. * nm1 + 1.);
        if !r0.is_finite() {
            return Err(RefractionError::Wavelength(wavelength));
        }
        Ok(r0 * z.tan())
    }
}
