//! Pose extraction: per-keypoint coordinate series from triangulated frames.

use crate::config::{NUM_KEYPOINTS, POSE_CHANNELS, RATE_RATIO};
use crate::error::{PrepError, Result};
use crate::types::{channel_names, Coord, KeypointIndex, Trial};

/// 51 equal-length channels in x1,y1,z1,...,z17 order
#[derive(Clone, Debug, PartialEq)]
pub struct KeypointSeries {
    channels: Vec<Vec<f64>>,
}

impl Default for KeypointSeries {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl KeypointSeries {
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            channels: (0..POSE_CHANNELS).map(|_| Vec::with_capacity(frames)).collect(),
        }
    }

    /// Build from channels already in table order. Fails unless there are 51 of equal length.
    pub fn from_channels(channels: Vec<Vec<f64>>) -> Result<Self> {
        let frames = channels.first().map(Vec::len).unwrap_or(0);
        if channels.len() != POSE_CHANNELS || channels.iter().any(|c| c.len() != frames) {
            let names = channel_names();
            let dims = channels
                .iter()
                .enumerate()
                .map(|(i, c)| (names.get(i).cloned().unwrap_or_else(|| format!("#{}", i)), c.len()))
                .collect();
            return Err(PrepError::ShapeMismatch {
                trial: "keypoint series".to_string(),
                frames,
                dims: (channels.len(), dims),
            });
        }
        Ok(Self { channels })
    }

    pub fn push_frame(&mut self, frame_index: usize, keypoints: &[[f64; 3]]) -> Result<()> {
        if keypoints.len() != NUM_KEYPOINTS {
            return Err(PrepError::MalformedFrame {
                frame: frame_index,
                keypoints: keypoints.len(),
            });
        }
        for (pos, xyz) in keypoints.iter().enumerate() {
            for (offset, value) in xyz.iter().enumerate() {
                self.channels[pos * 3 + offset].push(*value);
            }
        }
        Ok(())
    }

    pub fn channel(&self, keypoint: KeypointIndex, coord: Coord) -> &[f64] {
        &self.channels[keypoint.column(coord)]
    }

    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f64>> {
        self.channels
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Most pose frames a force record of `force_len` samples can back.
pub fn max_pose_frames(force_len: usize) -> usize {
    force_len.div_ceil(RATE_RATIO)
}

/// Keypoint series of `trial`, capped at ceil(force samples / 12) frames.
pub fn extract_pose(trial: &Trial) -> Result<KeypointSeries> {
    let cap = max_pose_frames(trial.grf.time()?.len());
    let frames = &trial.frames[..cap.min(trial.frames.len())];

    let mut series = KeypointSeries::with_capacity(frames.len());
    for (idx, frame) in frames.iter().enumerate() {
        series.push_frame(idx, &frame.triangulated_pose)?;
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ForceRecord, PoseFrame};

    fn frame(base: f64) -> PoseFrame {
        PoseFrame {
            triangulated_pose: (0..NUM_KEYPOINTS)
                .map(|k| {
                    let v = base + k as f64 * 10.0;
                    [v, v + 1.0, v + 2.0]
                })
                .collect(),
        }
    }

    fn trial(frames: usize, force_len: usize) -> Trial {
        let mut grf = ForceRecord::new();
        grf.insert("time", (0..force_len).map(|i| i as f64 / 600.0).collect());
        Trial {
            subject: "Subject1".to_string(),
            movement: "Squat".to_string(),
            frames: (0..frames).map(|f| frame(f as f64 * 1000.0)).collect(),
            grf,
        }
    }

    #[test]
    fn test_max_pose_frames() {
        assert_eq!(max_pose_frames(0), 0);
        assert_eq!(max_pose_frames(12), 1);
        assert_eq!(max_pose_frames(13), 2);
        assert_eq!(max_pose_frames(600), 50);
    }

    #[test]
    fn test_extract_caps_at_force_duration() {
        // 30 force samples support ceil(30/12) = 3 frames
        let series = extract_pose(&trial(5, 30)).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.channels().iter().all(|c| c.len() == 3));

        let kp3 = KeypointIndex::new(3).unwrap();
        assert_eq!(series.channel(kp3, Coord::X), &[20.0, 1020.0, 2020.0]);
        assert_eq!(series.channel(kp3, Coord::Z), &[22.0, 1022.0, 2022.0]);
    }

    #[test]
    fn test_extract_fewer_frames_than_cap() {
        let series = extract_pose(&trial(2, 120)).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_malformed_frame() {
        let mut t = trial(2, 24);
        t.frames[1].triangulated_pose.pop();
        assert!(matches!(
            extract_pose(&t),
            Err(PrepError::MalformedFrame { frame: 1, keypoints: 16 })
        ));
    }

    #[test]
    fn test_from_channels_rejects_ragged() {
        let mut channels = vec![vec![0.0; 4]; POSE_CHANNELS];
        channels[7].pop();
        assert!(matches!(
            KeypointSeries::from_channels(channels),
            Err(PrepError::ShapeMismatch { .. })
        ));
    }
}
