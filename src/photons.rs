//! Photon batches
//!
//! Photons are stored column-wise. Wavelength and time columns are only allocated
//! when an upstream operator sets them.

use serde::{Deserialize, Serialize};
use std::{io, path::Path};

#[derive(Debug, thiserror::Error)]
pub enum PhotonsError {
    #[error("photon column {column} has {found} entries, expected {expected}")]
    Size {
        column: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("failed to read or write photons")]
    Csv(#[from] csv::Error),
    #[error("failed to open photons file")]
    Io(#[from] io::Error),
}

type Result<T> = std::result::Result<T, PhotonsError>;

#[derive(Deserialize, Serialize, Debug, PartialEq)]
struct Record {
    x: f64,
    y: f64,
    flux: f64,
    #[serde(default)]
    wavelength: Option<f64>,
    #[serde(default)]
    time: Option<f64>,
}

/// A batch of photons
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotonArray {
    pub(crate) x: Vec<f64>,
    pub(crate) y: Vec<f64>,
    pub(crate) flux: Vec<f64>,
    pub(crate) wavelength: Option<Vec<f64>>,
    pub(crate) time: Option<Vec<f64>>,
}
impl PhotonArray {
    /// Creates a batch of photons from their positions and fluxes
    pub fn new(x: Vec<f64>, y: Vec<f64>, flux: Vec<f64>) -> Result<Self> {
        let n = x.len();
        check_size("y", &y, n)?;
        check_size("flux", &flux, n)?;
        Ok(Self {
            x,
            y,
            flux,
            ..Default::default()
        })
    }
    /// Sets the photons wavelength \[nm\]
    pub fn with_wavelength(self, wavelength: Vec<f64>) -> Result<Self> {
        check_size("wavelength", &wavelength, self.len())?;
        Ok(Self {
            wavelength: Some(wavelength),
            ..self
        })
    }
    /// Sets the photons arrival time \[s\]
    pub fn with_time(self, time: Vec<f64>) -> Result<Self> {
        check_size("time", &time, self.len())?;
        Ok(Self {
            time: Some(time),
            ..self
        })
    }
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    pub fn x(&self) -> &[f64] {
        &self.x
    }
    pub fn y(&self) -> &[f64] {
        &self.y
    }
    pub fn flux(&self) -> &[f64] {
        &self.flux
    }
    pub fn wavelength(&self) -> Option<&[f64]> {
        self.wavelength.as_deref()
    }
    pub fn time(&self) -> Option<&[f64]> {
        self.time.as_deref()
    }
    pub fn has_allocated_wavelengths(&self) -> bool {
        self.wavelength.is_some()
    }
    /// Mutable access to both position columns
    pub fn xy_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.x, &mut self.y)
    }
    /// Loads photons from a CSV file with columns `x,y,flux[,wavelength][,time]`
    ///
    /// The wavelength (time) column is allocated only if every photon has one.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path)?;
        let mut this = PhotonArray::default();
        let mut wavelength = vec![];
        let mut time = vec![];
        for result in rdr.deserialize() {
            let row: Record = result?;
            this.x.push(row.x);
            this.y.push(row.y);
            this.flux.push(row.flux);
            wavelength.push(row.wavelength);
            time.push(row.time);
        }
        if !this.is_empty() {
            this.wavelength = wavelength.into_iter().collect();
            this.time = time.into_iter().collect();
        }
        Ok(this)
    }
    /// Writes the photons to a CSV file
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for i in 0..self.len() {
            wtr.serialize(Record {
                x: self.x[i],
                y: self.y[i],
                flux: self.flux[i],
                wavelength: self.wavelength.as_ref().map(|w| w[i]),
                time: self.time.as_ref().map(|t| t[i]),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn check_size(column: &'static str, data: &[f64], expected: usize) -> Result<()> {
    if data.len() == expected {
        Ok(())
    } else {
        Err(PhotonsError::Size {
            column,
            found: data.len(),
            expected,
        })
    }
}
