//! Per-column standardization with scalers persisted per model name.
//!
//! The load-or-fit-and-save sequence is not guarded against concurrent
//! processes: callers must serialize runs that share a model name.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{info, warn};
use ndarray::{concatenate, Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::assemble::TrialTable;
use crate::error::{PrepError, Result};

/// Fitted column means and scales
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub var: Vec<f64>,
    pub scale: Vec<f64>,
    pub n_samples_seen: usize,
    pub fitted_at: String,
}

impl Scaler {
    /// Fit on rows of `data`. Population variance; constant columns get scale 1.
    pub fn fit(data: ArrayView2<'_, f64>) -> Self {
        let width = data.ncols();
        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(width));
        let var = if data.nrows() == 0 {
            Array1::zeros(width)
        } else {
            data.var_axis(Axis(0), 0.0)
        };
        let scale = var.mapv(|v| if v == 0.0 { 1.0 } else { v.sqrt() });

        Self {
            mean: mean.to_vec(),
            var: var.to_vec(),
            scale: scale.to_vec(),
            n_samples_seen: data.nrows(),
            fitted_at: Utc::now().to_rfc3339(),
        }
    }

    /// Fit over the row-wise concatenation of every table
    pub fn fit_tables(tables: &[TrialTable]) -> Result<Self> {
        let views: Vec<ArrayView2<'_, f64>> = tables.iter().map(|t| t.data.view()).collect();
        if let Some(width) = views.first().map(|v| v.ncols()) {
            if let Some(bad) = views.iter().find(|v| v.ncols() != width) {
                return Err(PrepError::ScalerShape {
                    expected: width,
                    actual: bad.ncols(),
                });
            }
        }
        let all = concatenate(Axis(0), &views).unwrap_or_else(|_| Array2::zeros((0, 0)));
        Ok(Self::fit(all.view()))
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    fn check_width(&self, actual: usize) -> Result<()> {
        if actual != self.width() {
            return Err(PrepError::ScalerShape {
                expected: self.width(),
                actual,
            });
        }
        Ok(())
    }

    pub fn transform(&self, data: &mut Array2<f64>) -> Result<()> {
        self.check_width(data.ncols())?;
        for mut row in data.rows_mut() {
            row.iter_mut()
                .zip(&self.mean)
                .zip(&self.scale)
                .for_each(|((v, m), s)| *v = (*v - m) / s);
        }
        Ok(())
    }

    pub fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_width(data.ncols())?;
        self.inverse_transform_columns(data, 0)
    }

    /// Undo standardization on data holding columns `offset..offset + width` only,
    /// e.g. label predictions that start at column 51.
    pub fn inverse_transform_columns(&self, data: ArrayView2<'_, f64>, offset: usize) -> Result<Array2<f64>> {
        let end = offset + data.ncols();
        if end > self.width() {
            return Err(PrepError::ScalerShape {
                expected: self.width(),
                actual: end,
            });
        }
        let mean = &self.mean[offset..end];
        let scale = &self.scale[offset..end];
        let mut out = data.to_owned();
        for mut row in out.rows_mut() {
            row.iter_mut()
                .zip(mean)
                .zip(scale)
                .for_each(|((v, m), s)| *v = *v * s + m);
        }
        Ok(out)
    }
}

/// Scaler artifacts under a base directory, one gzip JSON file per model
#[derive(Clone, Debug)]
pub struct ScalerStore {
    dir: PathBuf,
}

impl ScalerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, model_name: &str) -> PathBuf {
        self.dir.join(format!("scaler_{}.gz", model_name))
    }

    pub fn load(&self, model_name: &str) -> Result<Scaler> {
        let path = self.path_for(model_name);
        if !path.exists() {
            return Err(PrepError::ScalerNotFound(path));
        }
        read_scaler(&path)
    }

    pub fn save(&self, scaler: &Scaler, model_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(model_name);
        let mut encoder = GzEncoder::new(BufWriter::new(File::create(&path)?), Compression::default());
        serde_json::to_writer(&mut encoder, scaler)?;
        encoder.finish()?.flush()?;
        Ok(path)
    }

    /// Stored scaler for `model_name`, or a new one fitted on `tables` and saved.
    pub fn load_or_fit(&self, model_name: &str, tables: &[TrialTable]) -> Result<Scaler> {
        match self.load(model_name) {
            Ok(scaler) => {
                info!("Loaded data scaler {}", self.path_for(model_name).display());
                return Ok(scaler);
            }
            Err(PrepError::ScalerNotFound(_)) => {}
            Err(e) => warn!("Unreadable scaler for {}, refitting: {}", model_name, e),
        }
        let scaler = Scaler::fit_tables(tables)?;
        let path = self.save(&scaler, model_name)?;
        info!(
            "Saving data scaler ({} rows, {} columns) to {}",
            scaler.n_samples_seen,
            scaler.width(),
            path.display()
        );
        Ok(scaler)
    }
}

fn read_scaler(path: &Path) -> Result<Scaler> {
    let reader = BufReader::new(GzDecoder::new(File::open(path)?));
    Ok(serde_json::from_reader(reader)?)
}

/// Standardize every table with the scaler stored for `model_name`.
pub fn normalise_data(tables: Vec<TrialTable>, store: &ScalerStore, model_name: &str) -> Result<Vec<TrialTable>> {
    let scaler = store.load_or_fit(model_name, &tables)?;
    tables
        .into_iter()
        .map(|mut table| {
            scaler.transform(&mut table.data)?;
            Ok(table)
        })
        .collect()
}

/// Convert standardized data back to physical units with the scaler stored for `model_name`.
pub fn inverse_normalize(data: ArrayView2<'_, f64>, store: &ScalerStore, model_name: &str) -> Result<Array2<f64>> {
    store.load(model_name)?.inverse_transform(data)
}
