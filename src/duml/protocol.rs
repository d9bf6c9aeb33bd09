//! # DUML Protocol Constants and Types
//!
//! Core definitions for the DUML control link spoken by the RC-N1/N2 remote
//! controllers over their USB VCOM port.
//!
//! ## Frame Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | Magic (0x55) |
//! | 1 | 2 | Length (low 10 bits) + version (high 6 bits), LE |
//! | 3 | 1 | Header CRC8 over bytes 0..3 |
//! | 4 | 1 | Source address |
//! | 5 | 1 | Target address |
//! | 6 | 2 | Sequence number, LE |
//! | 8 | 1 | Command type |
//! | 9 | 1 | Command set |
//! | 10 | 1 | Command id |
//! | 11 | N | Payload |
//! | 11+N | 2 | Frame CRC16 over bytes 0..11+N, LE |

/// Frame start byte
pub const DUML_MAGIC: u8 = 0x55;

/// Magic + length word + header CRC
pub const DUML_HEADER_LEN: usize = 4;

/// Header, addresses, sequence and command fields
pub const DUML_PREAMBLE_LEN: usize = 11;

/// Trailing CRC16
pub const DUML_CRC_LEN: usize = 2;

/// Smallest valid frame (empty payload)
pub const DUML_MIN_FRAME_LEN: usize = DUML_PREAMBLE_LEN + DUML_CRC_LEN;

/// Mask for the length bits of the header word
pub const DUML_LENGTH_MASK: u16 = 0x03FF;

/// Largest frame the 10-bit length field can describe
pub const DUML_MAX_FRAME_LEN: usize = DUML_LENGTH_MASK as usize;

/// Largest payload that still fits the length field
pub const DUML_MAX_PAYLOAD_LEN: usize = DUML_MAX_FRAME_LEN - DUML_MIN_FRAME_LEN;

/// Protocol version written into the upper 6 bits of the header word
pub const DUML_PROTOCOL_VERSION: u16 = 1;

/// Seed of the header CRC8
pub const HEADER_CRC_SEED: u8 = 0x77;

/// Seed of the frame CRC16
pub const FRAME_CRC_SEED: u16 = 0x3692;

/// Host (PC) endpoint address
pub const ADDR_HOST: u8 = 0x0a;

/// Remote controller endpoint address
pub const ADDR_REMOTE_CONTROLLER: u8 = 0x06;

/// Initial sequence number used by the translator
pub const TRANSLATOR_SEQUENCE_SEED: u16 = 0x34eb;

/// Initial sequence number used by the simulator
pub const SIMULATOR_SEQUENCE_SEED: u16 = 0x4321;

/// Length of a stick telemetry response frame
pub const TELEMETRY_FRAME_LEN: usize = 38;

/// Length of a stick telemetry payload
pub const TELEMETRY_PAYLOAD_LEN: usize = TELEMETRY_FRAME_LEN - DUML_MIN_FRAME_LEN;

/// Command triple identifying an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub cmd_type: u8,
    pub cmd_set: u8,
    pub cmd_id: u8,
}

impl Command {
    pub const fn new(cmd_type: u8, cmd_set: u8, cmd_id: u8) -> Self {
        Self { cmd_type, cmd_set, cmd_id }
    }
}

/// Request current stick/dial values (empty payload)
pub const CMD_CHANNEL_VALUES: Command = Command::new(0x40, 0x06, 0x01);

/// Enable simulator (fast telemetry) mode, payload `[1]`
pub const CMD_SIMULATOR_MODE: Command = Command::new(0x40, 0x06, 0x24);

/// Payload that switches simulator mode on
pub const SIMULATOR_MODE_ON: [u8; 1] = [0x01];

/// Decoded DUML frame
///
/// `payload` borrows from the buffer the frame was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub sequence: u16,
    pub source: u8,
    pub target: u8,
    pub command: Command,
    pub payload: &'a [u8],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(DUML_MAGIC, 0x55);
        assert_eq!(DUML_MIN_FRAME_LEN, 13);
        assert_eq!(DUML_MAX_FRAME_LEN, 1023);
        assert_eq!(DUML_MAX_PAYLOAD_LEN, 1010);
        assert_eq!(TELEMETRY_PAYLOAD_LEN, 25);
        assert_eq!(TELEMETRY_FRAME_LEN, 38);
    }

    #[test]
    fn test_commands() {
        assert_eq!(CMD_CHANNEL_VALUES, Command::new(0x40, 0x06, 0x01));
        assert_eq!(CMD_SIMULATOR_MODE.cmd_id, 0x24);
        assert_ne!(CMD_CHANNEL_VALUES, CMD_SIMULATOR_MODE);
    }
}
