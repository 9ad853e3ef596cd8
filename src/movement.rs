//! Movement bucketing.
//!
//! Trial labels carry inconsistent trial numbers and separators
//! ("Squat_2", "Squat3"); they are normalized to a bare movement name and
//! grouped in first-seen order.

use log::{debug, error};

use crate::error::{PrepError, Result};
use crate::types::Trial;

/// Lookup key matching every bucket
pub const ALL_MOVEMENTS: &str = "all";

/// Strip every numeric character (any script) and underscore from a raw movement label
pub fn normalize_movement(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_numeric() && *c != '_')
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct MovementBucket {
    pub name: String,
    pub trials: Vec<Trial>,
}

/// Ordered movement name -> trials mapping
#[derive(Clone, Debug, Default)]
pub struct MovementBuckets {
    buckets: Vec<MovementBucket>,
}

impl MovementBuckets {
    pub fn from_trials(trials: &[Trial]) -> Self {
        let mut buckets: Vec<MovementBucket> = Vec::new();
        for trial in trials {
            let name = normalize_movement(&trial.movement);
            match buckets.iter_mut().find(|b| b.name == name) {
                Some(bucket) => bucket.trials.push(trial.clone()),
                None => buckets.push(MovementBucket {
                    name,
                    trials: vec![trial.clone()],
                }),
            }
        }
        for bucket in &buckets {
            debug!("Movement {}: {} trials", bucket.name, bucket.trials.len());
        }
        Self { buckets }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&[Trial]> {
        self.buckets
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.trials.as_slice())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Trial>> {
        self.buckets
            .iter_mut()
            .find(|b| b.name == name)
            .map(|b| &mut b.trials)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Trials of every bucket whose name case-insensitively equals `movement`,
    /// or of all buckets for `"all"`, concatenated in bucket order.
    pub fn trials_for(&self, movement: &str) -> Result<Vec<Trial>> {
        let wanted = movement.to_lowercase();
        let trials: Vec<Trial> = self
            .buckets
            .iter()
            .filter(|b| movement == ALL_MOVEMENTS || b.name.to_lowercase() == wanted)
            .flat_map(|b| b.trials.iter().cloned())
            .collect();

        if trials.is_empty() {
            error!("No data with movement type: {}", movement);
            return Err(PrepError::NoTrialsForMovement(movement.to_string()));
        }
        Ok(trials)
    }
}
