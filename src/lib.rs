//! Pose / ground-reaction-force preprocessing.
//!
//! Aligns 50 Hz triangulated pose with 600 Hz force-plate data, converts
//! force to acceleration by subject mass and slices each trial into
//! fixed-length sliding windows for sequence-model training.

pub mod acceleration;
pub mod assemble;
pub mod axis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod movement;
pub mod normalize;
pub mod pipeline;
pub mod pose;
pub mod resample;
pub mod types;
pub mod window;

pub use assemble::TrialTable;
pub use config::PipelineConfig;
pub use error::{PrepError, Result};
pub use pipeline::{Pipeline, PrepareOptions};
pub use types::{ForceRecord, PoseFrame, Trial};
pub use window::SampleSet;
