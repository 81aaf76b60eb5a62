use slitless_spec::{
    BuildContext, CelestialCoord, PhotonArray, PhotonOpRegistry, PixelScale, Position,
};
use std::{fs, path::PathBuf, time::Instant};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "slitless",
    about = "Applies a photon operator to a batch of photons"
)]
struct Opt {
    /// Photon operator JSON configuration, with the operator name under `type`
    #[structopt(short, long)]
    config: PathBuf,
    /// Photons CSV file (x,y,flux,wavelength[,time])
    #[structopt(short, long)]
    input: PathBuf,
    /// Transformed photons CSV file
    #[structopt(short, long)]
    output: PathBuf,
    /// Pixel scale [arcsec/px]
    #[structopt(long, default_value = "0.2")]
    pixel_scale: f64,
    /// Local WCS origin x [px]
    #[structopt(long, default_value = "0")]
    origin_x: f64,
    /// Local WCS origin y [px]
    #[structopt(long, default_value = "0")]
    origin_y: f64,
    /// Object right ascension [deg]
    #[structopt(long, requires = "dec")]
    ra: Option<f64>,
    /// Object declination [deg]
    #[structopt(long, requires = "ra")]
    dec: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let config: serde_json::Value = serde_json::from_str(&fs::read_to_string(&opt.config)?)?;
    let base = BuildContext {
        sky_pos: opt
            .ra
            .zip(opt.dec)
            .map(|(ra, dec)| CelestialCoord::from_degrees(ra, dec)),
    };
    let op = PhotonOpRegistry::default().build_from(config, &base)?;
    log::info!("{op}");

    log::info!("Loading {:?}...", opt.input);
    let mut photons = PhotonArray::from_csv(&opt.input)?;
    log::info!("... {} photons loaded", photons.len());

    let wcs = PixelScale::new(opt.pixel_scale).origin_at(Position::new(opt.origin_x, opt.origin_y));
    let now = Instant::now();
    op.apply_to(&mut photons, &wcs, None)?;
    log::info!("... applied in {:}ms", now.elapsed().as_millis());

    photons.to_csv(&opt.output)?;
    log::info!("photons written to {:?}", opt.output);
    Ok(())
}
