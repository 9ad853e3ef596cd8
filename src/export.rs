use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::dataset::is_gzip;
use crate::error::Result;
use crate::window::SampleSet;

/// Flat, JSON-serializable copy of a [`SampleSet`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleExport {
    pub feature_shape: Vec<usize>,
    /// Row-major
    pub features: Vec<f64>,
    pub label_shape: Vec<usize>,
    pub labels: Vec<f64>,
    pub trial_lengths: Vec<usize>,
}

impl SampleExport {
    pub fn from_samples(samples: &SampleSet) -> Self {
        Self {
            feature_shape: samples.features.shape().to_vec(),
            features: samples.features.iter().copied().collect(),
            label_shape: samples.labels.shape().to_vec(),
            labels: samples.labels.iter().copied().collect(),
            trial_lengths: samples.trial_lengths.clone(),
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write as JSON, gzip-compressed when the path ends in `.gz`
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            serde_json::to_writer(&mut encoder, self)?;
            encoder.finish()?.flush()?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        Ok(())
    }
}
