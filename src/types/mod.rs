pub mod keypoint;

pub use keypoint::*;

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::TIME_CHANNEL;
use crate::error::{PrepError, Result};

/// One capture session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trial {
    pub subject: String,
    pub movement: String,
    pub frames: Vec<PoseFrame>,
    pub grf: ForceRecord,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoseFrame {
    /// 17 keypoints as [x, y, z]
    pub triangulated_pose: Vec<[f64; 3]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForceChannel {
    pub name: String,
    pub samples: Vec<f64>,
}

/// Named 600 Hz force channels, kept in file order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForceRecord {
    channels: Vec<ForceChannel>,
}

impl ForceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a channel; new channels are appended.
    pub fn insert(&mut self, name: &str, samples: Vec<f64>) {
        match self.channels.iter_mut().find(|c| c.name == name) {
            Some(channel) => channel.samples = samples,
            None => self.channels.push(ForceChannel {
                name: name.to_string(),
                samples,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.samples.as_slice())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        self.channels
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.samples)
    }

    pub fn time(&self) -> Result<&[f64]> {
        self.get(TIME_CHANNEL)
            .ok_or_else(|| PrepError::MissingChannel(TIME_CHANNEL.to_string()))
    }

    /// Every channel except `time`, in file order
    pub fn force_channels(&self) -> impl Iterator<Item = &ForceChannel> {
        self.channels.iter().filter(|c| c.name != TIME_CHANNEL)
    }

    pub fn channels(&self) -> &[ForceChannel] {
        &self.channels
    }
}

impl Serialize for ForceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.channels.len()))?;
        for channel in &self.channels {
            map.serialize_entry(&channel.name, &channel.samples)?;
        }
        map.end()
    }
}

struct ForceRecordVisitor;

impl<'de> Visitor<'de> for ForceRecordVisitor {
    type Value = ForceRecord;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of force channel name to samples")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut record = ForceRecord::new();
        while let Some((name, samples)) = access.next_entry::<String, Vec<f64>>()? {
            record.insert(&name, samples);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for ForceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ForceRecordVisitor)
    }
}
