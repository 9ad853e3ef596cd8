//! Rate reconciliation between 50 Hz pose and 600 Hz force.
//!
//! Pose is upsampled by filling each frame gap with `RATE_RATIO - 1`
//! incremental steps; force is downsampled by averaging blocks of
//! `RATE_RATIO` samples.

use crate::config::RATE_RATIO;
use crate::error::{PrepError, Result};
use crate::pose::KeypointSeries;
use crate::types::channel_names;

const EXTRA_POINTS: usize = RATE_RATIO - 1;

/// How pose and force are brought onto a common sample grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// Pose linearly upsampled to the 600 Hz force grid
    Interpolate,
    /// Force block-averaged down to the 50 Hz pose grid
    BlockAverage,
}

impl Reconciliation {
    pub fn from_flag(linear_interpolation: bool) -> Self {
        if linear_interpolation {
            Reconciliation::Interpolate
        } else {
            Reconciliation::BlockAverage
        }
    }
}

/// Upsample one channel to `target_len` samples.
///
/// Every sample with a successor is emitted followed by 11 values built by
/// adding `(next - value) / 11` to a running accumulator, so each gap yields
/// 12 samples. The final sample is repeated until `target_len` is reached.
/// Returns `None` when the filled gaps alone exceed `target_len`.
pub fn interpolate_channel(samples: &[f64], target_len: usize) -> Option<Vec<f64>> {
    let mut out = Vec::with_capacity(target_len);
    for (idx, &value) in samples.iter().enumerate() {
        match samples.get(idx + 1) {
            Some(&next) => {
                out.push(value);
                let inc = (next - value) / EXTRA_POINTS as f64;
                let mut acc = value;
                for _ in 0..EXTRA_POINTS {
                    acc += inc;
                    out.push(acc);
                }
            }
            None => {
                if out.len() > target_len {
                    return None;
                }
                out.resize(target_len, value);
            }
        }
    }
    Some(out)
}

/// Upsample every keypoint channel to exactly `target_len` samples.
///
/// An empty series stays empty; the acceleration step reports the mismatch.
pub fn populate_pose_gaps(pose: &KeypointSeries, target_len: usize) -> Result<KeypointSeries> {
    let names = channel_names();
    let channels = pose
        .channels()
        .iter()
        .zip(names)
        .map(|(samples, name)| {
            interpolate_channel(samples, target_len).ok_or_else(|| PrepError::InterpolationOverflow {
                channel: name,
                produced: (samples.len().saturating_sub(1)) * RATE_RATIO,
                target: target_len,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    KeypointSeries::from_channels(channels)
}

/// Average consecutive blocks of `RATE_RATIO` samples, stopping once `max_blocks`
/// values have been produced.
///
/// A trailing partial block is averaged over the samples it holds. The cap is
/// checked after each block, so `max_blocks == 0` never stops early and every
/// block is averaged; the caller's length check then reports the mismatch.
pub fn block_average(samples: &[f64], max_blocks: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(max_blocks.min(samples.len().div_ceil(RATE_RATIO)));
    for block in samples.chunks(RATE_RATIO) {
        out.push(block.iter().sum::<f64>() / block.len() as f64);
        if out.len() == max_blocks {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::POSE_CHANNELS;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_interpolate_exact_length() {
        for target in [13usize, 24, 25, 35, 36] {
            let samples = [0.0, 11.0, 22.0];
            let frames = target.div_ceil(RATE_RATIO);
            let out = interpolate_channel(&samples[..frames.min(3)], target).unwrap();
            assert_eq!(out.len(), target);
        }
    }

    #[test]
    fn test_interpolate_values() {
        let out = interpolate_channel(&[0.0, 11.0, 0.0], 30).unwrap();
        assert_eq!(out.len(), 30);
        // first gap rises by 1.0 per step, second gap falls
        for (i, v) in out[..12].iter().enumerate() {
            assert_abs_diff_eq!(*v, i as f64, epsilon = 1e-9);
        }
        assert_eq!(out[12], 11.0);
        for pair in out[12..24].windows(2) {
            assert!(pair[1] < pair[0]);
        }
        // tail repeats the last original sample
        assert!(out[24..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_interpolate_accumulates_drift() {
        let out = interpolate_channel(&[0.0, 1.0], 24).unwrap();
        let mut acc = 0.0;
        for v in &out[1..12] {
            acc += 1.0 / 11.0;
            assert_eq!(*v, acc);
        }
    }

    #[test]
    fn test_interpolate_single_sample() {
        assert_eq!(interpolate_channel(&[4.0], 5).unwrap(), vec![4.0; 5]);
        assert!(interpolate_channel(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_interpolate_overflow() {
        // 3 frames need at least 25 samples
        assert!(interpolate_channel(&[0.0, 1.0, 2.0], 20).is_none());
    }

    #[test]
    fn test_populate_pose_gaps() {
        let channels: Vec<Vec<f64>> = (0..POSE_CHANNELS).map(|c| vec![c as f64, c as f64 + 11.0]).collect();
        let pose = KeypointSeries::from_channels(channels).unwrap();
        let up = populate_pose_gaps(&pose, 20).unwrap();
        assert_eq!(up.len(), 20);
        assert!(up.channels().iter().all(|c| c.len() == 20));
        assert_abs_diff_eq!(up.channels()[3][5], 8.0, epsilon = 1e-9);

        assert!(matches!(
            populate_pose_gaps(&pose, 10),
            Err(PrepError::InterpolationOverflow { target: 10, .. })
        ));
    }

    #[test]
    fn test_block_average() {
        let samples: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let avg = block_average(&samples, 10);
        // blocks: 0..12, 12..24, 24..30
        assert_eq!(avg, vec![5.5, 17.5, 26.5]);
        assert_eq!(block_average(&samples, 2), vec![5.5, 17.5]);
    }

    #[test]
    fn test_block_average_zero_cap_keeps_every_block() {
        let samples: Vec<f64> = (0..30).map(|i| i as f64).collect();
        assert_eq!(block_average(&samples, 0), vec![5.5, 17.5, 26.5]);
        assert!(block_average(&[], 0).is_empty());
    }
}
