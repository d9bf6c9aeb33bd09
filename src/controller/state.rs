//! # Axis State
//!
//! The five telemetry channels in gamepad axis units.

use super::mapping::{from_axis, to_axis};
use crate::duml::telemetry::RawChannels;

/// Snapshot of every stick and the camera dial
///
/// Always handled as a whole value so readers never see channels from two
/// different telemetry frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisState {
    pub right_horizontal: i16,
    pub right_vertical: i16,
    pub left_horizontal: i16,
    pub left_vertical: i16,
    pub camera_dial: i16,
}

impl AxisState {
    /// All channels centred
    pub const NEUTRAL: AxisState = AxisState {
        right_horizontal: 0,
        right_vertical: 0,
        left_horizontal: 0,
        left_vertical: 0,
        camera_dial: 0,
    };

    pub fn from_raw(raw: &RawChannels) -> Self {
        Self {
            right_horizontal: to_axis(raw.right_horizontal),
            right_vertical: to_axis(raw.right_vertical),
            left_horizontal: to_axis(raw.left_horizontal),
            left_vertical: to_axis(raw.left_vertical),
            camera_dial: to_axis(raw.camera_dial),
        }
    }

    pub fn to_raw(&self) -> RawChannels {
        RawChannels {
            right_horizontal: from_axis(self.right_horizontal as i32),
            right_vertical: from_axis(self.right_vertical as i32),
            left_horizontal: from_axis(self.left_horizontal as i32),
            left_vertical: from_axis(self.left_vertical as i32),
            camera_dial: from_axis(self.camera_dial as i32),
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    /// Channels in a fixed order, for comparisons
    pub fn channels(&self) -> [i16; 5] {
        [
            self.right_horizontal,
            self.right_vertical,
            self.left_horizontal,
            self.left_vertical,
            self.camera_dial,
        ]
    }

    /// Largest per-channel distance to `other`
    pub fn max_distance(&self, other: &AxisState) -> i32 {
        self.channels()
            .iter()
            .zip(other.channels().iter())
            .map(|(&a, &b)| (a as i32 - b as i32).abs())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::mapping::{AXIS_QUANTIZATION_STEP, RAW_CENTER, RAW_MAX, RAW_MIN};

    #[test]
    fn test_default_is_neutral() {
        assert!(AxisState::default().is_neutral());
        assert_eq!(AxisState::NEUTRAL.to_raw().camera_dial, RAW_CENTER);
    }

    #[test]
    fn test_from_raw_maps_each_channel() {
        let raw = RawChannels {
            right_horizontal: RAW_MAX,
            right_vertical: RAW_MIN,
            left_horizontal: RAW_CENTER,
            left_vertical: 1025,
            camera_dial: 1023,
        };
        let state = AxisState::from_raw(&raw);
        assert_eq!(state.right_horizontal, i16::MAX);
        assert_eq!(state.right_vertical, i16::MIN);
        assert_eq!(state.left_horizontal, 0);
        assert_eq!(state.left_vertical, 49);
        assert_eq!(state.camera_dial, -49);
    }

    #[test]
    fn test_raw_round_trip_within_quantization() {
        let state = AxisState {
            right_horizontal: 12345,
            right_vertical: -32768,
            left_horizontal: 32767,
            left_vertical: -777,
            camera_dial: 30000,
        };
        let back = AxisState::from_raw(&state.to_raw());
        assert!(back.max_distance(&state) <= AXIS_QUANTIZATION_STEP);
    }
}
