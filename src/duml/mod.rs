//! # DUML Protocol Module
//!
//! Implementation of the DUML control protocol spoken by DJI remote
//! controllers over their USB VCOM port.
//!
//! This module handles:
//! - Frame building and validation (header CRC8, frame CRC16)
//! - Frame recovery from an undelimited byte stream
//! - Stick telemetry payload layout
//! - Per-endpoint sequence numbering

pub mod protocol;
pub mod crc;
pub mod encoder;
pub mod decoder;
pub mod telemetry;
pub mod reader;
pub mod link;
