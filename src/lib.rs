/*!
# Slitless spectroscopy photon operator

Wavelength dependent geometric transform of photons shot by an image simulation:
 - a chromatic scaling of the photons positions around the local WCS origin,
   `(w/base_wavelength)^alpha`,
 - the differential chromatic refraction of the atmosphere, relative to the
   refraction at the base wavelength, along the parallactic angle.

## Usage

```rust,no_run
use slitless_spec::{
    Angle, PhotonArray, PhotonOp, PixelScale, Position, SlitlessSpec, TransformParameters,
};

let params = TransformParameters::new(700., 0.2, Angle::from_degrees(40.))
    .parallactic_angle(Angle::from_degrees(15.));
let op = SlitlessSpec::new(params)?;
let mut photons = PhotonArray::new(vec![1., 2.], vec![0., -1.], vec![1., 1.])?
    .with_wavelength(vec![500., 900.])?;
let wcs = PixelScale::new(0.2).origin_at(Position::new(0., 0.));
op.apply_to(&mut photons, &wcs, None)?;
# Ok::<(), slitless_spec::Error>(())
```
*/

pub mod angle;
pub mod celestial;
pub mod config;
mod error;
pub mod photons;
pub mod refraction;
pub mod registry;
pub mod slitless;
pub mod wcs;

pub use angle::{Angle, AngleUnit};
pub use celestial::CelestialCoord;
pub use config::{ConfigError, SlitlessSpecConfig, TransformParameters};
pub use error::{Error, Result};
pub use photons::PhotonArray;
pub use refraction::{Atmosphere, RefractionModel};
pub use registry::{BuildContext, PhotonOp, PhotonOpRegistry};
pub use slitless::SlitlessSpec;
pub use wcs::{JacobianWcs, LocalWcs, PixelScale, Position};
