//! Celestial coordinates and observing geometry
//!
//! The zenith and parallactic angles of an observation are derived from the
//! position of the object and the position of the zenith on the sky.

use crate::angle::Angle;
use nalgebra as na;
use serde::Deserialize;
use std::fmt;

/// Equatorial coordinates (right ascension, declination)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialCoord {
    ra: Angle,
    dec: Angle,
}
impl CelestialCoord {
    pub fn new(ra: Angle, dec: Angle) -> Self {
        Self { ra, dec }
    }
    /// Creates a coordinate from (ra,dec) in degrees
    pub fn from_degrees(ra: f64, dec: f64) -> Self {
        Self::new(Angle::from_degrees(ra), Angle::from_degrees(dec))
    }
    /// North celestial pole
    pub fn north_pole() -> Self {
        Self::from_degrees(0., 90.)
    }
    pub fn ra(&self) -> Angle {
        self.ra
    }
    pub fn dec(&self) -> Angle {
        self.dec
    }
    /// Unit vector on the celestial sphere
    pub fn xyz(&self) -> na::Vector3<f64> {
        let (sin_ra, cos_ra) = self.ra.sincos();
        let (sin_dec, cos_dec) = self.dec.sincos();
        na::Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }
    /// Great circle distance to another coordinate
    pub fn distance_to(&self, other: &CelestialCoord) -> Angle {
        let (a, b) = (self.xyz(), other.xyz());
        Angle::from_radians(a.cross(&b).norm().atan2(a.dot(&b)))
    }
    /// Angle at this coordinate from the direction of `coord2` to the direction of `coord3`
    ///
    /// The angle is positive when the sweep from `coord2` to `coord3` is
    /// counter-clockwise as observed from Earth, i.e. north through east on the sky.
    pub fn angle_between(&self, coord2: &CelestialCoord, coord3: &CelestialCoord) -> Angle {
        let (a, b, c) = (self.xyz(), coord2.xyz(), coord3.xyz());
        let sin_c = a.dot(&c.cross(&b));
        let cos_c = b.dot(&c) - a.dot(&b) * a.dot(&c);
        Angle::from_radians(sin_c.atan2(cos_c))
    }
}
impl fmt::Display for CelestialCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ra:{}, dec:{})", self.ra, self.dec)
    }
}

/// (ra,dec) pair in degrees, as written in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RaDec {
    pub ra: f64,
    pub dec: f64,
}
impl From<RaDec> for CelestialCoord {
    fn from(RaDec { ra, dec }: RaDec) -> Self {
        CelestialCoord::from_degrees(ra, dec)
    }
}
impl From<CelestialCoord> for RaDec {
    fn from(coord: CelestialCoord) -> Self {
        RaDec {
            ra: coord.ra.deg(),
            dec: coord.dec.deg(),
        }
    }
}

/// Zenith coordinate from the hour angle of the object and the site latitude
pub fn zenith_from_hour_angle(obj_coord: &CelestialCoord, ha: Angle, latitude: Angle) -> CelestialCoord {
    CelestialCoord::new((obj_coord.ra + ha).wrap(), latitude)
}

/// Returns the zenith angle and the parallactic angle of an object
pub fn zenith_parallactic_angles(
    obj_coord: &CelestialCoord,
    zenith_coord: &CelestialCoord,
) -> (Angle, Angle) {
    let zenith_angle = obj_coord.distance_to(zenith_coord);
    let parallactic_angle = obj_coord.angle_between(&CelestialCoord::north_pole(), zenith_coord);
    (zenith_angle, parallactic_angle)
}
