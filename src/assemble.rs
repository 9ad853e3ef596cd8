use log::{debug, error, info};
use ndarray::{s, Array2, ArrayView1, ArrayView2, Axis};

use crate::acceleration::{add_accelerations, TrialChannels};
use crate::config::{PipelineConfig, POSE_CHANNELS};
use crate::error::{PrepError, Result};
use crate::pose::extract_pose;
use crate::resample::{populate_pose_gaps, Reconciliation};
use crate::types::Trial;

/// One assembled trial: 51 pose columns followed by acceleration columns,
/// one row per reconciled sample.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialTable {
    pub label: String,
    pub columns: Vec<String>,
    pub data: Array2<f64>,
}

impl TrialTable {
    /// Build from named columns; every column must have `num_frames` samples.
    pub fn from_channels(label: &str, channels: TrialChannels, num_frames: usize) -> Result<Self> {
        if channels.columns.iter().any(|c| c.len() != num_frames) {
            let dims = channels.dims();
            error!("Cannot assemble {}: {} pose frames, dims {:?}", label, num_frames, dims);
            return Err(PrepError::ShapeMismatch {
                trial: label.to_string(),
                frames: num_frames,
                dims,
            });
        }

        let width = channels.columns.len();
        let mut data = Array2::<f64>::zeros((num_frames, width));
        for (col, samples) in channels.columns.iter().enumerate() {
            data.column_mut(col)
                .iter_mut()
                .zip(samples)
                .for_each(|(slot, v)| *slot = *v);
        }

        Ok(Self {
            label: label.to_string(),
            columns: channels.names,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// `(label, frame)` row index, frames starting at 1
    pub fn index(&self) -> Vec<(String, usize)> {
        (1..=self.rows()).map(|f| (self.label.clone(), f)).collect()
    }

    pub fn pose(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., ..POSE_CHANNELS.min(self.width())])
    }

    pub fn force(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., POSE_CHANNELS.min(self.width())..])
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.data.index_axis(Axis(1), i))
    }

    pub fn force_channels(&self) -> usize {
        self.width().saturating_sub(POSE_CHANNELS)
    }
}

/// Synthetic trial label for the `idx`-th (zero-based) trial
pub fn trial_label(idx: usize) -> String {
    format!("trail_{}", idx + 1)
}

/// Assemble one table per trial, in input order.
pub fn collect_format_data(
    trials: &[Trial],
    config: &PipelineConfig,
    mode: Reconciliation,
) -> Result<Vec<TrialTable>> {
    let tables = trials
        .iter()
        .enumerate()
        .map(|(idx, trial)| assemble_trial(&trial_label(idx), trial, config, mode))
        .collect::<Result<Vec<_>>>()?;
    info!("Assembled {} trial tables ({:?})", tables.len(), mode);
    Ok(tables)
}

pub fn assemble_trial(
    label: &str,
    trial: &Trial,
    config: &PipelineConfig,
    mode: Reconciliation,
) -> Result<TrialTable> {
    let force_len = trial.grf.time()?.len();

    let mut pose = extract_pose(trial)?;
    if mode == Reconciliation::Interpolate {
        pose = populate_pose_gaps(&pose, force_len)?;
    }

    let num_frames = pose.len();
    let mass = config.subject_mass(&trial.subject)?;

    let channels = add_accelerations(TrialChannels::from_pose(pose), &trial.grf, mass, num_frames, mode)?;
    let table = TrialTable::from_channels(label, channels, num_frames)?;
    debug!(
        "{}: subject {} ({} kg), {} frames from {} force samples",
        label, trial.subject, mass, num_frames, force_len
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NUM_KEYPOINTS;
    use crate::types::{ForceRecord, PoseFrame};
    use approx::assert_relative_eq;

    fn trial(subject: &str, frames: usize, force_len: usize) -> Trial {
        let mut grf = ForceRecord::new();
        grf.insert("time", (0..force_len).map(|i| i as f64 / 600.0).collect());
        grf.insert("ground_force1_vx", vec![10.0; force_len]);
        grf.insert("ground_force1_vy", (0..force_len).map(|i| i as f64).collect());
        Trial {
            subject: subject.to_string(),
            movement: "Squat".to_string(),
            frames: (0..frames)
                .map(|f| PoseFrame {
                    triangulated_pose: vec![[f as f64, 0.0, 1.0]; NUM_KEYPOINTS],
                })
                .collect(),
            grf,
        }
    }

    #[test]
    fn test_block_average_table() {
        let config = PipelineConfig::default();
        let table = assemble_trial("trail_1", &trial("Subject1", 4, 36), &config, Reconciliation::BlockAverage)
            .unwrap();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.width(), POSE_CHANNELS + 2);
        assert_eq!(table.columns[POSE_CHANNELS], "ground_force1_vx");
        assert_relative_eq!(table.data[[0, POSE_CHANNELS]], 10.0 / 83.25);
        assert_relative_eq!(table.data[[2, POSE_CHANNELS + 1]], 29.5 / 83.25);
        assert_eq!(table.column("x1").unwrap().to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(table.index()[2], ("trail_1".to_string(), 3));
    }

    #[test]
    fn test_interpolated_table() {
        let config = PipelineConfig::default();
        let table = assemble_trial("trail_1", &trial("Subject2", 3, 30), &config, Reconciliation::Interpolate)
            .unwrap();
        assert_eq!(table.rows(), 30);
        let vy = table.column("ground_force1_vy").unwrap();
        assert_relative_eq!(vy[29], 29.0 / 86.48);
        assert_eq!(table.column("x1").unwrap()[12], 1.0);
        assert_eq!(table.column("x1").unwrap()[29], 2.0);
    }

    #[test]
    fn test_interpolation_with_too_few_frames_fails() {
        // no frames to upsample
        let config = PipelineConfig::default();
        let err = assemble_trial("trail_1", &trial("Subject1", 0, 30), &config, Reconciliation::Interpolate)
            .unwrap_err();
        assert!(matches!(err, PrepError::LengthMismatch { pose_frames: 0, forces: 30 }));
    }

    #[test]
    fn test_block_average_without_frames_fails() {
        let config = PipelineConfig::default();
        match assemble_trial("trail_2", &trial("Subject1", 0, 30), &config, Reconciliation::BlockAverage) {
            Err(PrepError::ShapeMismatch { trial, frames, dims }) => {
                assert_eq!(trial, "trail_2");
                assert_eq!(frames, 0);
                assert_eq!(dims.1.last().unwrap(), &("ground_force1_vy".to_string(), 3));
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_short_force_channel_mismatch() {
        let config = PipelineConfig::default();
        let mut t = trial("Subject1", 3, 36);
        t.grf.insert("ground_force1_vy", vec![1.0; 20]);
        match assemble_trial("trail_7", &t, &config, Reconciliation::BlockAverage) {
            Err(PrepError::ShapeMismatch { trial, frames, dims }) => {
                assert_eq!(trial, "trail_7");
                assert_eq!(frames, 3);
                assert_eq!(dims.0, POSE_CHANNELS + 2);
                assert_eq!(dims.1.last().unwrap(), &("ground_force1_vy".to_string(), 2));
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_subject() {
        let config = PipelineConfig::default();
        let result = collect_format_data(&[trial("Nobody", 2, 24)], &config, Reconciliation::BlockAverage);
        assert!(matches!(result, Err(PrepError::UnknownSubject(_))));
    }

    #[test]
    fn test_labels_preserve_order() {
        let config = PipelineConfig::default();
        let trials = vec![trial("Subject1", 2, 24), trial("Subject3", 1, 12)];
        let tables = collect_format_data(&trials, &config, Reconciliation::BlockAverage).unwrap();
        let labels: Vec<&str> = tables.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["trail_1", "trail_2"]);
        assert_eq!(tables[1].rows(), 1);
    }
}
