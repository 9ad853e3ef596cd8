use log::{debug, info};

use crate::config::PipelineConfig;
use crate::movement::MovementBuckets;
use crate::types::Trial;

/// Negate the configured channels of one trial. Absent channels are skipped.
pub fn flip_xz_axes(trial: &Trial, channels: &[String]) -> Trial {
    let mut flipped = trial.clone();
    for name in channels {
        if let Some(samples) = flipped.grf.get_mut(name) {
            samples.iter_mut().for_each(|v| *v = -*v);
        }
    }
    flipped
}

/// Return a copy of `buckets` with the mirrored force plates corrected.
///
/// For every correction rule the first `trials` trials of that movement get
/// their x/z force channels negated. Movements missing from the buckets are
/// skipped.
pub fn fix_flipped_axes(buckets: &MovementBuckets, config: &PipelineConfig) -> MovementBuckets {
    let mut fixed = buckets.clone();
    for rule in &config.axis_corrections {
        let Some(trials) = fixed.get_mut(&rule.movement) else {
            debug!("No {} trials, skipping axis correction", rule.movement);
            continue;
        };
        let count = rule.trials.min(trials.len());
        for trial in trials.iter_mut().take(count) {
            *trial = flip_xz_axes(trial, &config.flipped_channels);
        }
        info!("Flipped x/z force axes for {} {} trials", count, rule.movement);
    }
    fixed
}
