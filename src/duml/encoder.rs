//! # DUML Frame Encoder
//!
//! Builds complete DUML frames, including both checksums.

use super::crc::{frame_crc16, header_crc8};
use super::protocol::*;
use crate::error::{BridgeError, Result};

/// Build a complete DUML frame
///
/// # Arguments
///
/// * `sequence` - Sender's sequence number for this frame
/// * `source` - Source endpoint address
/// * `target` - Target endpoint address
/// * `command` - Command type/set/id triple
/// * `payload` - Payload bytes (at most 1010)
///
/// # Errors
///
/// Returns `PayloadTooLarge` if the frame length would not fit the 10-bit
/// length field.
///
/// # Examples
///
/// ```
/// use rc_nx_bridge::duml::encoder::build_frame;
/// use rc_nx_bridge::duml::protocol::{ADDR_HOST, ADDR_REMOTE_CONTROLLER, CMD_CHANNEL_VALUES};
///
/// let frame = build_frame(0x34eb, ADDR_HOST, ADDR_REMOTE_CONTROLLER, CMD_CHANNEL_VALUES, &[])?;
/// assert_eq!(frame, [0x55, 0x0d, 0x04, 0x33, 0x0a, 0x06, 0xeb, 0x34, 0x40, 0x06, 0x01, 0x74, 0x24]);
/// # Ok::<(), rc_nx_bridge::error::BridgeError>(())
/// ```
pub fn build_frame(
    sequence: u16,
    source: u8,
    target: u8,
    command: Command,
    payload: &[u8],
) -> Result<Vec<u8>> {
    if payload.len() > DUML_MAX_PAYLOAD_LEN {
        return Err(BridgeError::PayloadTooLarge {
            len: payload.len(),
            max: DUML_MAX_PAYLOAD_LEN,
        });
    }

    let length = DUML_MIN_FRAME_LEN + payload.len();
    let header_word = (length as u16 & DUML_LENGTH_MASK) | (DUML_PROTOCOL_VERSION << 10);

    let mut frame = Vec::with_capacity(length);
    frame.push(DUML_MAGIC);
    frame.extend_from_slice(&header_word.to_le_bytes());
    frame.push(header_crc8(&frame[..3]));

    frame.push(source);
    frame.push(target);
    frame.extend_from_slice(&sequence.to_le_bytes());
    frame.push(command.cmd_type);
    frame.push(command.cmd_set);
    frame.push(command.cmd_id);
    frame.extend_from_slice(payload);

    let crc = frame_crc16(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());

    debug_assert_eq!(frame.len(), length);
    Ok(frame)
}
