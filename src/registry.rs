//! Photon operators registry
//!
//! Photon operators are built by name from a JSON configuration record.
//! A record may carry its operator name under the `type` key:
//! ```json
//! {"type": "SlitlessSpec", "base_wavelength": 700, "zenith_angle": 30}
//! ```

use crate::{
    celestial::CelestialCoord,
    config::{ConfigError, SlitlessSpecConfig},
    error::Result,
    photons::PhotonArray,
    slitless::SlitlessSpec,
    wcs::LocalWcs,
};
use rand::RngCore;
use serde_json::Value;
use std::{collections::HashMap, fmt};

/// Photon operator interface
pub trait PhotonOp: fmt::Display + Send + Sync {
    /// Applies the operator to a batch of photons, in place
    ///
    /// On error, the photons are left unchanged.
    fn apply_to(
        &self,
        photons: &mut PhotonArray,
        local_wcs: &dyn LocalWcs,
        rng: Option<&mut dyn RngCore>,
    ) -> Result<()>;
}

/// Context of the object the operators are built for
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildContext {
    /// Sky position of the object, used as `obj_coord`
    pub sky_pos: Option<CelestialCoord>,
}

pub type Builder = fn(Value, &BuildContext) -> Result<Box<dyn PhotonOp>>;

fn build_slitless_spec(config: Value, base: &BuildContext) -> Result<Box<dyn PhotonOp>> {
    let mut config = SlitlessSpecConfig::from_value(config)?;
    if let Some(sky_pos) = base.sky_pos {
        config = config.obj_coord(sky_pos);
    }
    Ok(Box::new(SlitlessSpec::from_config(&config)?))
}

/// Name to builder table
pub struct PhotonOpRegistry(HashMap<&'static str, Builder>);
impl Default for PhotonOpRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("SlitlessSpec", build_slitless_spec);
        registry
    }
}
impl PhotonOpRegistry {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }
    /// Registers a builder, returning the builder it replaces
    pub fn register(&mut self, name: &'static str, builder: Builder) -> Option<Builder> {
        self.0.insert(name, builder)
    }
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.0.keys().copied().collect();
        names.sort_unstable();
        names
    }
    /// Builds the operator registered as `name`
    pub fn build(&self, name: &str, config: Value, base: &BuildContext) -> Result<Box<dyn PhotonOp>> {
        let builder = self
            .0
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOperator(name.to_string()))?;
        log::debug!("building photon operator {name}");
        builder(config, base)
    }
    /// Builds the operator named by the `type` key of the configuration record
    pub fn build_from(&self, mut config: Value, base: &BuildContext) -> Result<Box<dyn PhotonOp>> {
        let name = match config.as_object_mut().and_then(|record| record.remove("type")) {
            Some(Value::String(name)) => name,
            _ => {
                return Err(ConfigError::UnknownOperator(
                    "configuration record without a string `type`".to_string(),
                )
                .into())
            }
        };
        self.build(&name, config, base)
    }
}
impl fmt::Debug for PhotonOpRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
