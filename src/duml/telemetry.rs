//! # Stick Telemetry Payload
//!
//! Layout of the 25-byte payload carried by a channel values response. Each
//! channel is a little-endian `u16` in the controller's native range
//! (364..=1684, centre 1024) followed by one unused byte.
//!
//! | Offset | Channel |
//! |--------|---------|
//! | 2 | Right stick horizontal |
//! | 5 | Right stick vertical |
//! | 8 | Left stick vertical |
//! | 11 | Left stick horizontal |
//! | 14 | Camera dial |

use super::protocol::TELEMETRY_PAYLOAD_LEN;
use crate::error::{BridgeError, Result};

const RIGHT_HORIZONTAL_OFFSET: usize = 2;
const RIGHT_VERTICAL_OFFSET: usize = 5;
const LEFT_VERTICAL_OFFSET: usize = 8;
const LEFT_HORIZONTAL_OFFSET: usize = 11;
const CAMERA_DIAL_OFFSET: usize = 14;

/// Channel values in the controller's native units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChannels {
    pub right_horizontal: u16,
    pub right_vertical: u16,
    pub left_horizontal: u16,
    pub left_vertical: u16,
    pub camera_dial: u16,
}

fn read_u16(payload: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([payload[offset], payload[offset + 1]])
}

fn write_u16(payload: &mut [u8], offset: usize, value: u16) {
    payload[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Decode a stick telemetry payload
///
/// # Errors
///
/// Returns `Decode` if the payload is not exactly 25 bytes.
pub fn decode_channels(payload: &[u8]) -> Result<RawChannels> {
    if payload.len() != TELEMETRY_PAYLOAD_LEN {
        return Err(BridgeError::Decode(format!(
            "Telemetry payload must be {} bytes, got {}",
            TELEMETRY_PAYLOAD_LEN,
            payload.len()
        )));
    }

    Ok(RawChannels {
        right_horizontal: read_u16(payload, RIGHT_HORIZONTAL_OFFSET),
        right_vertical: read_u16(payload, RIGHT_VERTICAL_OFFSET),
        left_vertical: read_u16(payload, LEFT_VERTICAL_OFFSET),
        left_horizontal: read_u16(payload, LEFT_HORIZONTAL_OFFSET),
        camera_dial: read_u16(payload, CAMERA_DIAL_OFFSET),
    })
}

/// Encode channels into a stick telemetry payload; unused bytes are zero
pub fn encode_channels(channels: &RawChannels) -> [u8; TELEMETRY_PAYLOAD_LEN] {
    let mut payload = [0u8; TELEMETRY_PAYLOAD_LEN];
    write_u16(&mut payload, RIGHT_HORIZONTAL_OFFSET, channels.right_horizontal);
    write_u16(&mut payload, RIGHT_VERTICAL_OFFSET, channels.right_vertical);
    write_u16(&mut payload, LEFT_VERTICAL_OFFSET, channels.left_vertical);
    write_u16(&mut payload, LEFT_HORIZONTAL_OFFSET, channels.left_horizontal);
    write_u16(&mut payload, CAMERA_DIAL_OFFSET, channels.camera_dial);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_field_order() {
        let mut payload = [0u8; TELEMETRY_PAYLOAD_LEN];
        payload[2..4].copy_from_slice(&364u16.to_le_bytes());
        payload[5..7].copy_from_slice(&1684u16.to_le_bytes());
        payload[8..10].copy_from_slice(&1000u16.to_le_bytes());
        payload[11..13].copy_from_slice(&1100u16.to_le_bytes());
        payload[14..16].copy_from_slice(&1024u16.to_le_bytes());

        let channels = decode_channels(&payload).unwrap();
        assert_eq!(channels.right_horizontal, 364);
        assert_eq!(channels.right_vertical, 1684);
        assert_eq!(channels.left_vertical, 1000);
        assert_eq!(channels.left_horizontal, 1100);
        assert_eq!(channels.camera_dial, 1024);
    }

    #[test]
    fn test_decode_ignores_unused_bytes() {
        let channels = RawChannels {
            right_horizontal: 1,
            right_vertical: 2,
            left_horizontal: 3,
            left_vertical: 4,
            camera_dial: 5,
        };
        let mut payload = encode_channels(&channels);
        for offset in [0, 1, 4, 7, 10, 13, 16, 20, 24] {
            payload[offset] = 0xFF;
        }
        assert_eq!(decode_channels(&payload).unwrap(), channels);
    }

    #[test]
    fn test_encode_leaves_unused_bytes_zero() {
        let payload = encode_channels(&RawChannels {
            right_horizontal: 0xFFFF,
            right_vertical: 0xFFFF,
            left_horizontal: 0xFFFF,
            left_vertical: 0xFFFF,
            camera_dial: 0xFFFF,
        });
        assert_eq!(payload.iter().filter(|&&b| b == 0xFF).count(), 10);
        assert_eq!(&payload[16..], &[0u8; 9]);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(matches!(decode_channels(&[0u8; 24]), Err(BridgeError::Decode(_))));
        assert!(matches!(decode_channels(&[0u8; 26]), Err(BridgeError::Decode(_))));
    }
}
