use crate::{config::ConfigError, photons::PhotonsError, refraction::RefractionError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} requires that wavelengths be set")]
    MissingWavelength(&'static str),
    #[error("refraction model failed")]
    Refraction(#[from] RefractionError),
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error("invalid photon batch")]
    Photons(#[from] PhotonsError),
}

pub type Result<T> = std::result::Result<T, Error>;
