use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Force samples per pose frame (600 Hz / 50 Hz)
pub const RATE_RATIO: usize = 12;
pub const POSE_RATE_HZ: f64 = 50.0;
pub const FORCE_RATE_HZ: f64 = 600.0;
pub const NUM_KEYPOINTS: usize = 17;
/// 17 keypoints × (x, y, z)
pub const POSE_CHANNELS: usize = NUM_KEYPOINTS * 3;
pub const TIME_CHANNEL: &str = "time";

/// Sensor mirroring fix: negate the flipped channels of the first `trials` trials of `movement`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisCorrection {
    pub movement: String,
    pub trials: usize,
}

impl AxisCorrection {
    pub fn new(movement: &str, trials: usize) -> Self {
        Self {
            movement: movement.to_string(),
            trials,
        }
    }
}

/// Immutable pipeline configuration.
///
/// Defaults reproduce the capture sessions the pipeline was built for:
/// eight subjects and the recording sessions whose force plates were
/// mounted mirrored on x/z.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Subject identifier -> body mass (kg)
    pub subject_masses: BTreeMap<String, f64>,
    pub axis_corrections: Vec<AxisCorrection>,
    pub flipped_channels: Vec<String>,
    /// Number of force columns (starting at column 51) taken as labels
    pub label_channels: usize,
    pub scaler_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let subject_masses = [
            ("Subject1", 83.25),
            ("Subject2", 86.48),
            ("Subject3", 87.54),
            ("Subject4", 86.11),
            ("Subject5", 74.91),
            ("Subject6", 111.91),
            ("Subject7", 82.64),
            ("Subject8", 90.44),
        ]
        .into_iter()
        .map(|(subject, mass)| (subject.to_string(), mass))
        .collect();

        Self {
            subject_masses,
            axis_corrections: vec![
                AxisCorrection::new("CounterMovementJump", 3),
                AxisCorrection::new("SingleLegJumpR", 3),
                AxisCorrection::new("SingleLegJumpL", 3),
                AxisCorrection::new("SquatJump", 2),
                AxisCorrection::new("LSingleLegSquat", 3),
                AxisCorrection::new("RSingleLegSquat", 3),
                AxisCorrection::new("Squat", 3),
            ],
            flipped_channels: vec![
                "ground_force1_vx".to_string(),
                "ground_force1_vz".to_string(),
                "ground_force2_vx".to_string(),
                "ground_force2_vz".to_string(),
            ],
            label_channels: 6,
            scaler_dir: PathBuf::from("Models/scalers"),
        }
    }
}

impl PipelineConfig {
    /// Load a config from JSON. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.label_channels == 0 {
            return Err(PrepError::InvalidConfig(
                "label_channels must be at least 1".to_string(),
            ));
        }
        if let Some((subject, mass)) = self
            .subject_masses
            .iter()
            .find(|(_, mass)| !(mass.is_finite() && **mass > 0.0))
        {
            return Err(PrepError::InvalidConfig(format!(
                "mass for {} must be positive, got {}",
                subject, mass
            )));
        }
        Ok(())
    }

    pub fn subject_mass(&self, subject: &str) -> Result<f64> {
        self.subject_masses
            .get(subject)
            .copied()
            .ok_or_else(|| PrepError::UnknownSubject(subject.to_string()))
    }

    /// Mean body mass across the subject table
    pub fn average_mass(&self) -> f64 {
        if self.subject_masses.is_empty() {
            return 0.0;
        }
        self.subject_masses.values().sum::<f64>() / self.subject_masses.len() as f64
    }
}
