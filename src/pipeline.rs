use log::info;
use ndarray::{Array2, ArrayView2};

use crate::assemble::{collect_format_data, TrialTable};
use crate::axis::fix_flipped_axes;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::movement::{MovementBuckets, ALL_MOVEMENTS};
use crate::normalize::{inverse_normalize, normalise_data, ScalerStore};
use crate::resample::Reconciliation;
use crate::types::Trial;
use crate::window::{format_data_samples, LabelPosition, SampleSet};

/// Options for one preprocessing run
#[derive(Clone, Debug)]
pub struct PrepareOptions {
    /// Movement name to select, or `"all"`
    pub movement: String,
    pub sample_size: usize,
    /// Upsample pose to the force rate instead of block-averaging force
    pub linear_interpolation: bool,
    /// Label each window with its last row instead of its midpoint
    pub end_force: bool,
    /// Apply the configured x/z force-plate corrections
    pub fix_axes: bool,
    /// Standardize with the scaler stored under this name
    pub model_name: Option<String>,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            movement: ALL_MOVEMENTS.to_string(),
            sample_size: 10,
            linear_interpolation: false,
            end_force: false,
            fix_axes: false,
            model_name: None,
        }
    }
}

/// Raw trials -> aligned feature windows
pub struct Pipeline {
    config: PipelineConfig,
    store: ScalerStore,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let store = ScalerStore::new(config.scaler_dir.clone());
        Self { config, store }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn scaler_store(&self) -> &ScalerStore {
        &self.store
    }

    /// Group trials by movement, correcting mirrored force plates if requested.
    pub fn bucket(&self, trials: &[Trial], fix_axes: bool) -> MovementBuckets {
        let buckets = MovementBuckets::from_trials(trials);
        info!("Bucketed {} trials into {} movements", trials.len(), buckets.len());
        if fix_axes {
            fix_flipped_axes(&buckets, &self.config)
        } else {
            buckets
        }
    }

    /// Assembled (and optionally standardized) tables for the selected trials
    pub fn tables(&self, trials: &[Trial], options: &PrepareOptions) -> Result<Vec<TrialTable>> {
        let selected = self.bucket(trials, options.fix_axes).trials_for(&options.movement)?;
        info!("Selected {} {} trials", selected.len(), options.movement);

        let mode = Reconciliation::from_flag(options.linear_interpolation);
        let tables = collect_format_data(&selected, &self.config, mode)?;
        match &options.model_name {
            Some(model) => normalise_data(tables, &self.store, model),
            None => Ok(tables),
        }
    }

    pub fn prepare(&self, trials: &[Trial], options: &PrepareOptions) -> Result<SampleSet> {
        let tables = self.tables(trials, options)?;
        format_data_samples(
            &tables,
            options.sample_size,
            self.config.label_channels,
            LabelPosition::from_flag(options.end_force),
        )
    }

    pub fn inverse_normalize(&self, data: ArrayView2<'_, f64>, model_name: &str) -> Result<Array2<f64>> {
        inverse_normalize(data, &self.store, model_name)
    }
}
