//! Strongly-typed keypoint channel addressing.
//!
//! Internally pose channels are addressed by `(KeypointIndex, Coord)`; the
//! external column names ("x1", "y1", "z1", ..., "z17") are derived from it.

use std::fmt;

use crate::config::NUM_KEYPOINTS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Coord {
    X,
    Y,
    Z,
}

impl Coord {
    pub const ALL: [Coord; 3] = [Coord::X, Coord::Y, Coord::Z];

    pub fn offset(self) -> usize {
        match self {
            Coord::X => 0,
            Coord::Y => 1,
            Coord::Z => 2,
        }
    }

    pub fn prefix(self) -> char {
        match self {
            Coord::X => 'x',
            Coord::Y => 'y',
            Coord::Z => 'z',
        }
    }
}

/// 1-based keypoint index in 1..=17
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeypointIndex(u8);

impl KeypointIndex {
    pub fn new(index: usize) -> Option<Self> {
        if (1..=NUM_KEYPOINTS).contains(&index) {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Keypoint at zero-based position `pos` in a pose frame
    pub fn from_position(pos: usize) -> Option<Self> {
        Self::new(pos + 1)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = KeypointIndex> {
        (1..=NUM_KEYPOINTS as u8).map(KeypointIndex)
    }

    /// Column position in the x1,y1,z1,x2,... channel order
    pub fn column(self, coord: Coord) -> usize {
        (self.get() - 1) * 3 + coord.offset()
    }

    pub fn channel_name(self, coord: Coord) -> String {
        format!("{}{}", coord.prefix(), self.0)
    }
}

impl fmt::Display for KeypointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The 51 pose column names in table order
pub fn channel_names() -> Vec<String> {
    KeypointIndex::all()
        .flat_map(|kp| Coord::ALL.into_iter().map(move |c| kp.channel_name(c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::POSE_CHANNELS;

    #[test]
    fn test_index_bounds() {
        assert!(KeypointIndex::new(0).is_none());
        assert!(KeypointIndex::new(18).is_none());
        assert_eq!(KeypointIndex::from_position(16).unwrap().get(), 17);
    }

    #[test]
    fn test_channel_order() {
        let names = channel_names();
        assert_eq!(names.len(), POSE_CHANNELS);
        assert_eq!(&names[..4], &["x1", "y1", "z1", "x2"]);
        assert_eq!(names[50], "z17");

        let kp = KeypointIndex::new(5).unwrap();
        assert_eq!(names[kp.column(Coord::Y)], kp.channel_name(Coord::Y));
    }
}
