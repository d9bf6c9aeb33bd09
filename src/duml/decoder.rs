//! # DUML Frame Decoder
//!
//! Validates and decodes complete DUML frames.

use super::crc::{frame_crc16, header_crc8};
use super::protocol::*;
use crate::error::{BridgeError, Result};

/// Read the total frame length declared by a header
///
/// Returns `None` until `header` holds the magic byte and the 16-bit length
/// word.
pub fn declared_length(header: &[u8]) -> Option<usize> {
    let word = header.get(1..3)?;
    let word = u16::from_le_bytes([word[0], word[1]]);
    Some((word & DUML_LENGTH_MASK) as usize)
}

/// Parse a complete DUML frame
///
/// # Arguments
///
/// * `frame` - Exactly one serialized frame, magic byte through trailing CRC
///
/// # Returns
///
/// * `Result<Frame>` - Decoded frame whose payload borrows from `frame`
///
/// # Errors
///
/// Returns error if:
/// - Frame is shorter than 13 bytes (`Framing`)
/// - Magic byte is wrong (`Framing`)
/// - Declared length differs from the byte count (`Framing`)
/// - Header or frame CRC does not match (`Checksum`)
pub fn parse_frame(frame: &[u8]) -> Result<Frame<'_>> {
    if frame.len() < DUML_MIN_FRAME_LEN {
        return Err(BridgeError::Framing(format!(
            "Frame too short: {} bytes (minimum {})",
            frame.len(),
            DUML_MIN_FRAME_LEN
        )));
    }

    if frame[0] != DUML_MAGIC {
        return Err(BridgeError::Framing(format!("Invalid magic byte: 0x{:02X}", frame[0])));
    }

    let length = declared_length(frame).unwrap_or_default();
    if length != frame.len() {
        return Err(BridgeError::Framing(format!(
            "Length mismatch: header declares {} bytes, got {}",
            length,
            frame.len()
        )));
    }

    let header_crc = header_crc8(&frame[..3]);
    if header_crc != frame[3] {
        return Err(BridgeError::Checksum(format!(
            "Header CRC mismatch: expected 0x{:02X}, got 0x{:02X}",
            header_crc, frame[3]
        )));
    }

    let body_end = frame.len() - DUML_CRC_LEN;
    let received_crc = u16::from_le_bytes([frame[body_end], frame[body_end + 1]]);
    let calculated_crc = frame_crc16(&frame[..body_end]);
    if received_crc != calculated_crc {
        return Err(BridgeError::Checksum(format!(
            "Frame CRC mismatch: expected 0x{:04X}, got 0x{:04X}",
            calculated_crc, received_crc
        )));
    }

    Ok(Frame {
        source: frame[4],
        target: frame[5],
        sequence: u16::from_le_bytes([frame[6], frame[7]]),
        command: Command::new(frame[8], frame[9], frame[10]),
        payload: &frame[DUML_PREAMBLE_LEN..body_end],
    })
}
