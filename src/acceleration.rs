use log::error;

use crate::error::{ChannelDims, PrepError, Result};
use crate::pose::KeypointSeries;
use crate::resample::{block_average, Reconciliation};
use crate::types::{channel_names, ForceRecord};

/// Named columns of one trial before they become a table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrialChannels {
    pub names: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl TrialChannels {
    pub fn from_pose(pose: KeypointSeries) -> Self {
        Self {
            names: channel_names(),
            columns: pose.into_channels(),
        }
    }

    pub fn push(&mut self, name: &str, column: Vec<f64>) {
        self.names.push(name.to_string());
        self.columns.push(column);
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Channel count and per-channel lengths
    pub fn dims(&self) -> ChannelDims {
        let lens = self
            .names
            .iter()
            .zip(&self.columns)
            .map(|(name, column)| (name.clone(), column.len()))
            .collect();
        (self.names.len(), lens)
    }
}

/// Append `force / mass` for every non-time force channel.
///
/// With [`Reconciliation::Interpolate`] every force sample is kept and each
/// channel must hold exactly `num_frames` samples. With
/// [`Reconciliation::BlockAverage`] blocks of 12 samples are averaged and at
/// most `num_frames` values are kept per channel.
pub fn add_accelerations(
    mut data: TrialChannels,
    forces: &ForceRecord,
    mass: f64,
    num_frames: usize,
    mode: Reconciliation,
) -> Result<TrialChannels> {
    for channel in forces.force_channels() {
        let accelerations: Vec<f64> = match mode {
            Reconciliation::Interpolate => {
                let per_sample: Vec<f64> = channel.samples.iter().map(|f| f / mass).collect();
                if per_sample.len() != num_frames {
                    error!(
                        "Number of pose frames does not equal number of forces: pose frames {}, forces {}",
                        num_frames,
                        per_sample.len()
                    );
                    return Err(PrepError::LengthMismatch {
                        pose_frames: num_frames,
                        forces: per_sample.len(),
                    });
                }
                per_sample
            }
            Reconciliation::BlockAverage => block_average(&channel.samples, num_frames)
                .into_iter()
                .map(|f| f / mass)
                .collect(),
        };
        data.push(&channel.name, accelerations);
    }
    Ok(data)
}
