//! # DUML Checksums
//!
//! Both checksums are reflected table CRCs:
//!
//! - **Header**: CRC-8, polynomial 0x31 (reflected 0x8C), seed 0x77
//! - **Frame**: CRC-16, polynomial 0x1021 (reflected 0x8408), seed 0x3692

use super::protocol::{FRAME_CRC_SEED, HEADER_CRC_SEED};

/// Reflected CRC-8 polynomial
const CRC8_POLY_REFLECTED: u8 = 0x8C;

/// Reflected CRC-16 polynomial
const CRC16_POLY_REFLECTED: u16 = 0x8408;

/// Precomputed CRC8 lookup table
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Precomputed CRC16 lookup table
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x01) != 0 {
                crc = (crc >> 1) ^ CRC8_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Generate CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the CRC8 of `data` starting from `seed`
pub fn crc8_with_seed(seed: u8, data: &[u8]) -> u8 {
    let mut crc = seed;

    for &byte in data {
        crc = CRC8_TABLE[(crc ^ byte) as usize];
    }

    crc
}

/// Calculate the CRC16 of `data` starting from `seed`
pub fn crc16_with_seed(seed: u16, data: &[u8]) -> u16 {
    let mut crc = seed;

    for &byte in data {
        crc = (crc >> 8) ^ CRC16_TABLE[((crc ^ byte as u16) & 0xFF) as usize];
    }

    crc
}

/// Header checksum over the magic byte and length word
///
/// # Examples
///
/// ```
/// use rc_nx_bridge::duml::crc::header_crc8;
///
/// assert_eq!(header_crc8(&[0x55, 0x0d, 0x04]), 0x33);
/// ```
pub fn header_crc8(header: &[u8]) -> u8 {
    crc8_with_seed(HEADER_CRC_SEED, header)
}

/// Frame checksum over every byte preceding the trailing CRC
pub fn frame_crc16(data: &[u8]) -> u16 {
    crc16_with_seed(FRAME_CRC_SEED, data)
}

/// Bitwise CRC8 (slow, for verifying the table)
#[allow(dead_code)]
fn crc8_slow(seed: u8, data: &[u8]) -> u8 {
    let mut crc = seed;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x01) != 0 {
                crc = (crc >> 1) ^ CRC8_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

/// Bitwise CRC16 (slow, for verifying the table)
#[allow(dead_code)]
fn crc16_slow(seed: u16, data: &[u8]) -> u16 {
    let mut crc = seed;

    for &byte in data {
        crc ^= byte as u16;

        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
