//! Operator configuration
//!
//! A configuration record is deserialized into [SlitlessSpecConfig] and validated
//! into the immutable [TransformParameters] of the operator.
//! Angles are given in degree and wavelengths in nm.
//!
//! The observing geometry is given either
//!  - directly with `zenith_angle` and, optionally, `parallactic_angle`,
//!  - with `obj_coord` and `zenith_coord`,
//!  - with `obj_coord`, the hour angle `HA` and the site `latitude`.

use crate::{
    angle::{Angle, AngleUnit},
    celestial::{zenith_from_hour_angle, zenith_parallactic_angles, CelestialCoord, RaDec},
    refraction::{Atmosphere, RefractionError},
};
use serde::Deserialize;
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base wavelength must be a positive number of nm, found {0}")]
    BaseWavelength(f64),
    #[error("alpha must be a finite number, found {0}")]
    Alpha(f64),
    #[error("invalid observing geometry: {0}")]
    Geometry(String),
    #[error("invalid atmosphere")]
    Atmosphere(#[from] RefractionError),
    #[error("failed to parse the configuration")]
    Parse(#[from] serde_json::Error),
    #[error("no photon operator registered as {0:?}")]
    UnknownOperator(String),
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration record of the slitless spectroscopy operator
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlitlessSpecConfig {
    /// Wavelength \[nm\] represented by the fiducial photon positions
    pub base_wavelength: f64,
    /// Power law index of the chromatic scaling
    #[serde(default)]
    pub alpha: f64,
    /// Unit of the local WCS tangent plane
    #[serde(default)]
    pub scale_unit: AngleUnit,
    pub zenith_angle: Option<f64>,
    pub parallactic_angle: Option<f64>,
    pub obj_coord: Option<RaDec>,
    pub zenith_coord: Option<RaDec>,
    /// Hour angle of the object
    #[serde(rename = "HA")]
    pub ha: Option<f64>,
    pub latitude: Option<f64>,
    /// Air pressure \[kPa\]
    pub pressure: Option<f64>,
    /// Air temperature \[K\]
    pub temperature: Option<f64>,
    /// Water vapor pressure \[kPa\]
    #[serde(rename = "H2O_pressure")]
    pub h2o_pressure: Option<f64>,
    /// Resolving power polynomial coefficients, not used by the transform
    pub resolution: Option<Vec<f64>>,
}

/// Validated parameters of the slitless spectroscopy operator
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParameters {
    pub base_wavelength: f64,
    pub alpha: f64,
    pub zenith_angle: Angle,
    pub parallactic_angle: Angle,
    pub scale_unit: AngleUnit,
    pub atmosphere: Atmosphere,
    pub resolution: Vec<f64>,
}
impl TransformParameters {
    /// Parameters for a given zenith angle, with default parallactic angle, scale unit and atmosphere
    pub fn new(base_wavelength: f64, alpha: f64, zenith_angle: Angle) -> Self {
        Self {
            base_wavelength,
            alpha,
            zenith_angle,
            parallactic_angle: Angle::default(),
            scale_unit: AngleUnit::default(),
            atmosphere: Atmosphere::default(),
            resolution: vec![],
        }
    }
    pub fn parallactic_angle(self, parallactic_angle: Angle) -> Self {
        Self {
            parallactic_angle,
            ..self
        }
    }
    pub fn scale_unit(self, scale_unit: AngleUnit) -> Self {
        Self { scale_unit, ..self }
    }
    pub fn atmosphere(self, atmosphere: Atmosphere) -> Self {
        Self { atmosphere, ..self }
    }
}

impl SlitlessSpecConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
    /// Sets the object coordinate
    pub fn obj_coord(self, obj_coord: CelestialCoord) -> Self {
        Self {
            obj_coord: Some(obj_coord.into()),
            ..self
        }
    }
    /// Zenith and parallactic angles
    pub fn geometry(&self) -> Result<(Angle, Angle)> {
        let direct = |zenith_angle: f64| {
            (
                Angle::from_degrees(zenith_angle),
                Angle::from_degrees(self.parallactic_angle.unwrap_or_default()),
            )
        };
        let (zenith_angle, parallactic_angle) = match (
            self.obj_coord,
            self.zenith_coord,
            self.ha,
            self.latitude,
            self.zenith_angle,
        ) {
            (Some(obj), Some(zenith), None, None, None) if self.parallactic_angle.is_none() => {
                zenith_parallactic_angles(&obj.into(), &zenith.into())
            }
            (Some(obj), None, Some(ha), Some(latitude), None)
                if self.parallactic_angle.is_none() =>
            {
                let obj: CelestialCoord = obj.into();
                let zenith =
                    zenith_from_hour_angle(&obj, Angle::from_degrees(ha), Angle::from_degrees(latitude));
                zenith_parallactic_angles(&obj, &zenith)
            }
            (_, None, None, None, Some(zenith_angle)) => direct(zenith_angle),
            (None, Some(_), _, _, _) | (None, _, Some(_), _, _) | (None, _, _, Some(_), _) => {
                return Err(ConfigError::Geometry(
                    "zenith_coord, HA and latitude require obj_coord".into(),
                ))
            }
            (Some(_), None, Some(_), None, None) => {
                return Err(ConfigError::Geometry("HA requires latitude".into()))
            }
            (Some(_), None, None, Some(_), None) => {
                return Err(ConfigError::Geometry("latitude requires HA".into()))
            }
            (_, None, None, None, None) => {
                return Err(ConfigError::Geometry(
                    "one of zenith_angle, zenith_coord or HA with latitude is required".into(),
                ))
            }
            _ => {
                return Err(ConfigError::Geometry(
                    "only one of zenith_angle, zenith_coord or HA with latitude may be given, \
                     and parallactic_angle only with zenith_angle"
                        .into(),
                ))
            }
        };
        if !(zenith_angle.rad().is_finite() && parallactic_angle.rad().is_finite()) {
            return Err(ConfigError::Geometry(format!(
                "non-finite angles: zenith={zenith_angle}, parallactic={parallactic_angle}"
            )));
        }
        if !(0f64..FRAC_PI_2).contains(&zenith_angle.rad()) {
            return Err(ConfigError::Geometry(format!(
                "zenith angle must be in [0,90[ degree, found {zenith_angle}"
            )));
        }
        Ok((zenith_angle, parallactic_angle))
    }
    /// Validates the configuration
    pub fn params(&self) -> Result<TransformParameters> {
        if !(self.base_wavelength.is_finite() && self.base_wavelength > 0.) {
            return Err(ConfigError::BaseWavelength(self.base_wavelength));
        }
        if !self.alpha.is_finite() {
            return Err(ConfigError::Alpha(self.alpha));
        }
        let (zenith_angle, parallactic_angle) = self.geometry()?;
        let default = Atmosphere::default();
        let atmosphere = Atmosphere {
            pressure: self.pressure.unwrap_or(default.pressure),
            temperature: self.temperature.unwrap_or(default.temperature),
            h2o_pressure: self.h2o_pressure.unwrap_or(default.h2o_pressure),
        };
        atmosphere.check()?;
        let resolution = self.resolution.clone().unwrap_or_default();
        if !resolution.is_empty() {
            log::warn!("SlitlessSpec: resolution {resolution:?} is accepted but not used");
        }
        Ok(TransformParameters {
            base_wavelength: self.base_wavelength,
            alpha: self.alpha,
            zenith_angle,
            parallactic_angle,
            scale_unit: self.scale_unit,
            atmosphere,
            resolution,
        })
    }
}
