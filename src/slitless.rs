//! Slitless spectroscopy photon operator
//!
//! The photons positions are first scaled around the local WCS origin by the
//! chromatic power law `(w/base_wavelength)^alpha` and then displaced by the
//! differential chromatic refraction with respect to the base wavelength.

use crate::{
    config::{ConfigError, SlitlessSpecConfig, TransformParameters},
    error::{Error, Result},
    photons::PhotonArray,
    refraction::{Atmosphere, RefractionError, RefractionModel},
    registry::PhotonOp,
    wcs::{LocalWcs, Position},
};
use rand::RngCore;
use rayon::prelude::*;
use std::fmt;

/// Chromatic scaling and differential chromatic refraction operator
#[derive(Debug, Clone)]
pub struct SlitlessSpec<R = Atmosphere> {
    params: TransformParameters,
    /// refraction \[rad\] at the base wavelength
    base_refraction: f64,
    model: R,
}
impl SlitlessSpec {
    /// Creates the operator with the atmosphere refraction model
    pub fn new(params: TransformParameters) -> Result<Self> {
        let model = params.atmosphere;
        Self::with_model(params, model)
    }
    pub fn from_config(config: &SlitlessSpecConfig) -> Result<Self> {
        Self::new(config.params()?)
    }
}
impl<R: RefractionModel> SlitlessSpec<R> {
    /// Creates the operator with a given refraction model
    pub fn with_model(params: TransformParameters, model: R) -> Result<Self> {
        if !(params.base_wavelength.is_finite() && params.base_wavelength > 0.) {
            return Err(ConfigError::BaseWavelength(params.base_wavelength).into());
        }
        let base_refraction = model.refraction(params.base_wavelength, params.zenith_angle)?;
        log::debug!(
            "SlitlessSpec: zenith angle={}, parallactic angle={}, base refraction={:.3e}rad",
            params.zenith_angle,
            params.parallactic_angle,
            base_refraction
        );
        Ok(Self {
            params,
            base_refraction,
            model,
        })
    }
    pub fn params(&self) -> &TransformParameters {
        &self.params
    }
    pub fn base_refraction(&self) -> f64 {
        self.base_refraction
    }
    /// Chromatic scaling factor at `wavelength`
    pub fn scale(&self, wavelength: f64) -> f64 {
        (wavelength / self.params.base_wavelength).powf(self.params.alpha)
    }
    /// Scales the positions around the `origin`
    fn chromatic_scaling(&self, x: &mut [f64], y: &mut [f64], wavelength: &[f64], origin: Position) {
        if self.params.alpha == 0. {
            return;
        }
        let Position { x: cenx, y: ceny } = origin;
        x.par_iter_mut()
            .zip(y.par_iter_mut())
            .zip(wavelength.par_iter())
            .for_each(|((x, y), &w)| {
                let scale = self.scale(w);
                *x = scale * (*x - cenx) + cenx;
                *y = scale * (*y - ceny) + ceny;
            });
    }
    /// Image plane displacements due to the differential chromatic refraction
    fn refraction_offsets(
        &self,
        wavelength: &[f64],
        local_wcs: &dyn LocalWcs,
    ) -> Result<Vec<(f64, f64)>> {
        let zenith_angle = self.params.zenith_angle;
        let (sinp, cosp) = self.params.parallactic_angle.sincos();
        let to_scale_unit = self.params.scale_unit.value().recip();
        let offset = |w: f64| -> std::result::Result<(f64, f64), RefractionError> {
            let shift_magnitude =
                (self.model.refraction(w, zenith_angle)? - self.base_refraction) * to_scale_unit;
            let du = -shift_magnitude * sinp;
            let dv = shift_magnitude * cosp;
            Ok((local_wcs.x(du, dv), local_wcs.y(du, dv)))
        };
        Ok(wavelength
            .par_iter()
            .map(|&w| offset(w))
            .collect::<std::result::Result<Vec<_>, RefractionError>>()?)
    }
}

fn displace(x: &mut [f64], y: &mut [f64], offsets: &[(f64, f64)]) {
    x.par_iter_mut()
        .zip(y.par_iter_mut())
        .zip(offsets.par_iter())
        .for_each(|((x, y), (dx, dy))| {
            *x += dx;
            *y += dy;
        });
}

impl<R: RefractionModel> PhotonOp for SlitlessSpec<R> {
    fn apply_to(
        &self,
        photons: &mut PhotonArray,
        local_wcs: &dyn LocalWcs,
        _rng: Option<&mut dyn RngCore>,
    ) -> Result<()> {
        let PhotonArray {
            x, y, wavelength, ..
        } = photons;
        let wavelength = wavelength
            .as_deref()
            .ok_or(Error::MissingWavelength("SlitlessSpec"))?;
        log::trace!("SlitlessSpec: applying to {} photons", wavelength.len());
        // refraction is evaluated first so that a model failure leaves the photons untouched
        let offsets = self.refraction_offsets(wavelength, local_wcs)?;
        self.chromatic_scaling(x, y, wavelength, local_wcs.origin());
        displace(x, y, &offsets);
        Ok(())
    }
}

impl<R> fmt::Display for SlitlessSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SlitlessSpec(base_wavelength={}, scale_unit={}, alpha={})",
            self.params.base_wavelength, self.params.scale_unit, self.params.alpha
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        angle::{Angle, AngleUnit},
        wcs::{JacobianWcs, PixelScale},
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn photons(xy: &[(f64, f64)], wavelength: &[f64]) -> PhotonArray {
        let (x, y): (Vec<f64>, Vec<f64>) = xy.iter().cloned().unzip();
        let n = x.len();
        PhotonArray::new(x, y, vec![1.; n])
            .unwrap()
            .with_wavelength(wavelength.to_vec())
            .unwrap()
    }

    fn random_photons(n: usize, seed: u64) -> PhotonArray {
        let mut rng = StdRng::seed_from_u64(seed);
        let x = (0..n).map(|_| rng.gen_range(-50f64..50.)).collect();
        let y = (0..n).map(|_| rng.gen_range(-50f64..50.)).collect();
        let w = (0..n).map(|_| rng.gen_range(400f64..1000.)).collect();
        PhotonArray::new(x, y, vec![1.; n])
            .unwrap()
            .with_wavelength(w)
            .unwrap()
    }

    /// Refraction linear with wavelength
    struct Linear(f64);
    impl RefractionModel for Linear {
        fn refraction(&self, wavelength: f64, _zenith_angle: Angle) -> std::result::Result<f64, RefractionError> {
            Ok(self.0 * wavelength)
        }
    }

    #[test]
    fn achromatic_at_zenith() {
        let op = SlitlessSpec::new(TransformParameters::new(1000., 0., Angle::from_degrees(0.))).unwrap();
        let mut p = random_photons(1000, 1);
        let p0 = p.clone();
        let wcs = PixelScale::new(0.2).origin_at(Position::new(3., -4.));
        op.apply_to(&mut p, &wcs, None).unwrap();
        assert_eq!(p, p0);
    }

    #[test]
    fn no_scaling_when_alpha_is_zero() {
        let op = SlitlessSpec::new(TransformParameters::new(1000., 0., Angle::from_degrees(30.))).unwrap();
        let p = random_photons(100, 2);
        let (mut x, mut y) = (p.x().to_vec(), p.y().to_vec());
        op.chromatic_scaling(&mut x, &mut y, p.wavelength().unwrap(), Position::new(10., 10.));
        assert_eq!(x, p.x());
        assert_eq!(y, p.y());
    }

    #[test]
    fn linear_scaling() {
        let op = SlitlessSpec::new(TransformParameters::new(1000., 1., Angle::from_degrees(0.))).unwrap();
        let mut p = photons(&[(2., 0.), (1., -1.)], &[2000., 500.]);
        op.apply_to(&mut p, &PixelScale::new(1.), None).unwrap();
        assert_eq!(p.x(), &[4., 0.5]);
        assert_eq!(p.y(), &[0., -0.5]);
    }

    #[test]
    fn scaling_monotonicity() {
        for alpha in [0.1, 1., 2.5] {
            let op =
                SlitlessSpec::new(TransformParameters::new(600., alpha, Angle::from_degrees(0.))).unwrap();
            assert!(op.scale(700.) < op.scale(800.));
            assert!(op.scale(400.) < op.scale(500.));
            assert_eq!(op.scale(600.), 1.);
        }
        let op = SlitlessSpec::new(TransformParameters::new(600., -1., Angle::from_degrees(0.))).unwrap();
        assert!(op.scale(700.) > op.scale(800.));
    }

    #[test]
    fn base_wavelength_is_fixed() {
        for p_deg in [0., 30., 90., 145., -60.] {
            let params = TransformParameters::new(750., 0.7, Angle::from_degrees(50.))
                .parallactic_angle(Angle::from_degrees(p_deg));
            let op = SlitlessSpec::new(params).unwrap();
            let mut p = photons(&[(12.5, -3.25), (0., 0.)], &[750., 750.]);
            let p0 = p.clone();
            let wcs = JacobianWcs::rotated(0.2, 0.3)
                .unwrap()
                .origin_at(Position::new(1., 2.));
            op.apply_to(&mut p, &wcs, None).unwrap();
            assert_eq!(p, p0, "parallactic angle: {p_deg}");
        }
    }

    #[test]
    fn refraction_direction() {
        let wcs = PixelScale::new(1.);
        let params = TransformParameters::new(500., 0., Angle::from_degrees(30.))
            .scale_unit(AngleUnit::Radians);
        let op = SlitlessSpec::with_model(params.clone(), Linear(1e-3)).unwrap();
        let mut p = photons(&[(0., 0.)], &[600.]);
        op.apply_to(&mut p, &wcs, None).unwrap();
        assert!(p.x()[0].abs() < 1e-12);
        assert!((p.y()[0] - 0.1).abs() < 1e-12);

        let op = SlitlessSpec::with_model(
            params.parallactic_angle(Angle::from_degrees(90.)),
            Linear(1e-3),
        )
        .unwrap();
        let mut p = photons(&[(0., 0.)], &[600.]);
        op.apply_to(&mut p, &wcs, None).unwrap();
        assert!((p.x()[0] + 0.1).abs() < 1e-12);
        assert!(p.y()[0].abs() < 1e-12);
    }

    #[test]
    fn refraction_in_scale_unit() {
        let params = TransformParameters::new(500., 0., Angle::from_degrees(30.));
        let op = SlitlessSpec::with_model(params, Linear(1e-8)).unwrap();
        let mut p = photons(&[(0., 0.)], &[600.]);
        op.apply_to(&mut p, &PixelScale::new(0.5), None).unwrap();
        // 1e-6 rad in arcsec over 0.5 arcsec/px
        let expected = 1e-6f64.to_degrees() * 3600. / 0.5;
        assert!((p.y()[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn scaling_before_refraction() {
        let params = TransformParameters::new(600., 1., Angle::from_degrees(45.))
            .parallactic_angle(Angle::from_degrees(30.));
        let op = SlitlessSpec::new(params).unwrap();
        let wcs = PixelScale::new(0.2).origin_at(Position::new(1., 2.));
        let mut p = photons(&[(10., 5.)], &[800.]);

        let (mut x, mut y) = (p.x().to_vec(), p.y().to_vec());
        let w = p.wavelength().unwrap().to_vec();
        let offsets = op.refraction_offsets(&w, &wcs).unwrap();
        displace(&mut x, &mut y, &offsets);
        op.chromatic_scaling(&mut x, &mut y, &w, wcs.origin());

        op.apply_to(&mut p, &wcs, None).unwrap();

        let scale = 800. / 600.;
        let (dx, dy) = offsets[0];
        assert!(dx.hypot(dy) > 0.1);
        assert!((p.x()[0] - (scale * 9. + 1. + dx)).abs() < 1e-9);
        assert!((p.y()[0] - (scale * 3. + 2. + dy)).abs() < 1e-9);
        let reversed = (x[0] - p.x()[0]).hypot(y[0] - p.y()[0]);
        assert!(reversed > 1e-3, "{reversed}");
    }

    #[test]
    fn missing_wavelength() {
        let op = SlitlessSpec::new(TransformParameters::new(600., 1., Angle::from_degrees(45.))).unwrap();
        let mut p = PhotonArray::new(vec![1., 2.], vec![3., 4.], vec![1., 1.]).unwrap();
        let p0 = p.clone();
        let err = op.apply_to(&mut p, &PixelScale::new(0.2), None).unwrap_err();
        assert!(matches!(err, Error::MissingWavelength(_)));
        assert_eq!(err.to_string(), "SlitlessSpec requires that wavelengths be set");
        assert_eq!(p, p0);
    }

    #[test]
    fn refraction_failure_leaves_photons_untouched() {
        let op = SlitlessSpec::new(TransformParameters::new(600., 1., Angle::from_degrees(45.))).unwrap();
        let mut p = photons(&[(1., 1.), (2., 2.), (3., 3.)], &[500., -10., 700.]);
        let p0 = p.clone();
        let err = op.apply_to(&mut p, &PixelScale::new(0.2), None).unwrap_err();
        assert!(matches!(
            err,
            Error::Refraction(RefractionError::Wavelength(w)) if w == -10.
        ));
        assert_eq!(p, p0);
    }

    #[test]
    fn invalid_zenith_angle() {
        let err = SlitlessSpec::new(TransformParameters::new(600., 1., Angle::from_degrees(100.))).unwrap_err();
        assert!(matches!(err, Error::Refraction(RefractionError::ZenithAngle(_))));
    }

    #[test]
    fn deterministic() {
        let params = TransformParameters::new(700., -0.3, Angle::from_degrees(40.))
            .parallactic_angle(Angle::from_degrees(-20.));
        let op = SlitlessSpec::new(params).unwrap();
        let wcs = JacobianWcs::new(0.2, 0.01, -0.02, 0.19)
            .unwrap()
            .origin_at(Position::new(5., 5.));
        let mut a = random_photons(10_000, 7);
        let mut b = a.clone();
        let mut rng = StdRng::seed_from_u64(42);
        op.apply_to(&mut a, &wcs, Some(&mut rng as &mut dyn RngCore))
            .unwrap();
        op.apply_to(&mut b, &wcs, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn shared_across_batches() {
        let op = SlitlessSpec::new(
            TransformParameters::new(700., 0.5, Angle::from_degrees(20.))
                .parallactic_angle(Angle::from_degrees(10.)),
        )
        .unwrap();
        let wcs = PixelScale::new(0.2);
        let mut batches: Vec<_> = (0..8).map(|i| random_photons(500, i)).collect();
        let expected: Vec<_> = batches
            .iter()
            .cloned()
            .map(|mut p| {
                op.apply_to(&mut p, &wcs, None).unwrap();
                p
            })
            .collect();
        batches
            .par_iter_mut()
            .try_for_each(|p| op.apply_to(p, &wcs, None))
            .unwrap();
        assert_eq!(batches, expected);
    }

    #[test]
    fn display() {
        let op = SlitlessSpec::new(TransformParameters::new(1000., 0.5, Angle::from_degrees(10.))).unwrap();
        assert_eq!(
            op.to_string(),
            "SlitlessSpec(base_wavelength=1000, scale_unit=arcsec, alpha=0.5)"
        );
    }
}
