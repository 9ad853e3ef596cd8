//! Sliding-window sample formatting.
//!
//! Each trial of `n` rows yields `n - sample_size` windows (stride 1). A
//! window covers rows `idx - sample_size ..= idx - 1` of the pose columns and
//! is labelled from the force columns, either at its last row or around its
//! midpoint.

use log::{error, info};
use ndarray::{s, Array1, Array2, Array3, ArrayBase, Data, Dimension};

use crate::assemble::TrialTable;
use crate::config::POSE_CHANNELS;
use crate::error::{PrepError, Result};

/// Feature windows and labels ready for model training
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet {
    /// samples × sample_size × 51
    pub features: Array3<f64>,
    /// samples × label channels
    pub labels: Array2<f64>,
    /// Running sample count after each trial
    pub trial_lengths: Vec<usize>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.features.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which force row(s) label a window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelPosition {
    /// The window's last row
    End,
    /// The row at the window midpoint, or the mean of the two bracketing rows
    Middle,
}

impl LabelPosition {
    pub fn from_flag(end_force: bool) -> Self {
        if end_force {
            LabelPosition::End
        } else {
            LabelPosition::Middle
        }
    }
}

/// Midpoint of the window starting at `start` and ending at `end` (inclusive)
pub fn window_middle(start: usize, end: usize) -> f64 {
    let (start, end) = (start as f64, end as f64);
    start + (end - start) / 2.0
}

/// Rows averaged into the label of a window with midpoint `middle`.
///
/// An even midpoint selects that single row. Anything else (odd or
/// fractional) averages rows `floor(middle)..=ceil(middle)`, which is a
/// single row again when the midpoint is an odd integer.
pub fn label_rows(middle: f64) -> (usize, usize) {
    if middle % 2.0 == 0.0 {
        (middle as usize, middle as usize)
    } else {
        (middle.floor() as usize, middle.ceil() as usize)
    }
}

pub fn contains_nan<S, D>(data: &ArrayBase<S, D>) -> bool
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    data.iter().any(|v| v.is_nan())
}

/// Slice every trial into windows of `sample_size` rows.
pub fn format_data_samples(
    trials: &[TrialTable],
    sample_size: usize,
    label_channels: usize,
    position: LabelPosition,
) -> Result<SampleSet> {
    if sample_size == 0 {
        return Err(PrepError::InvalidConfig("sample_size must be at least 1".to_string()));
    }
    let required = POSE_CHANNELS + label_channels;
    if let Some(short) = trials.iter().find(|t| t.width() < required) {
        return Err(PrepError::InsufficientForceChannels {
            required: label_channels,
            available: short.width().saturating_sub(POSE_CHANNELS),
        });
    }

    let total: usize = trials.iter().map(|t| t.rows().saturating_sub(sample_size)).sum();
    let mut features = Array3::<f64>::zeros((total, sample_size, POSE_CHANNELS));
    let mut labels = Array2::<f64>::zeros((total, label_channels));
    let mut trial_lengths = Vec::with_capacity(trials.len());

    let label_cols = POSE_CHANNELS..required;
    let mut counter = 0;
    for trial in trials {
        for idx in sample_size..trial.rows() {
            let start = idx - sample_size;
            let end = idx - 1;

            features
                .slice_mut(s![counter, .., ..])
                .assign(&trial.data.slice(s![start..=end, ..POSE_CHANNELS]));

            let label: Array1<f64> = match position {
                LabelPosition::End => trial.data.slice(s![end, label_cols.clone()]).to_owned(),
                LabelPosition::Middle => {
                    let (lo, hi) = label_rows(window_middle(start, end));
                    let low = trial.data.slice(s![lo, label_cols.clone()]);
                    let high = trial.data.slice(s![hi, label_cols.clone()]);
                    (&low + &high) / 2.0
                }
            };
            labels.slice_mut(s![counter, ..]).assign(&label);
            counter += 1;
        }
        trial_lengths.push(counter);
    }

    let features_nan = contains_nan(&features);
    let labels_nan = contains_nan(&labels);
    if features_nan || labels_nan {
        error!("NaN detected in data (features: {}, labels: {})", features_nan, labels_nan);
        return Err(PrepError::NotANumber {
            features: features_nan,
            labels: labels_nan,
        });
    }

    info!(
        "Formatted {} samples of {} x {} features, {} labels",
        counter, sample_size, POSE_CHANNELS, label_channels
    );
    Ok(SampleSet {
        features,
        labels,
        trial_lengths,
    })
}
