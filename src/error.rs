use std::path::PathBuf;

use thiserror::Error;

/// Channel count plus `(name, len)` for every channel of a table that failed to assemble.
pub type ChannelDims = (usize, Vec<(String, usize)>);

/// Preprocessing error types
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Number of pose frames does not equal number of forces: pose frames {pose_frames}, forces {forces}")]
    LengthMismatch { pose_frames: usize, forces: usize },

    #[error("Channel lengths disagree in {trial}: {frames} pose frames, dims {dims:?}")]
    ShapeMismatch {
        trial: String,
        frames: usize,
        dims: ChannelDims,
    },

    #[error("Interpolated channel {channel} overshoots target: {produced} values for target {target}")]
    InterpolationOverflow {
        channel: String,
        produced: usize,
        target: usize,
    },

    #[error("Pose frame {frame} has {keypoints} keypoints, expected 17")]
    MalformedFrame { frame: usize, keypoints: usize },

    #[error("No data with movement type: {0}")]
    NoTrialsForMovement(String),

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Force record has no {0} channel")]
    MissingChannel(String),

    #[error("NaN detected in data (features: {features}, labels: {labels})")]
    NotANumber { features: bool, labels: bool },

    #[error("Need {required} force channels for labels, table has {available}")]
    InsufficientForceChannels { required: usize, available: usize },

    #[error("Scaler expects {expected} columns, data has {actual}")]
    ScalerShape { expected: usize, actual: usize },

    #[error("No scaler stored at {0}")]
    ScalerNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for preprocessing operations
pub type Result<T> = std::result::Result<T, PrepError>;
