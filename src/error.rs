//! # Error Types
//!
//! Custom error types for the RC-Nx bridge using `thiserror`.

use thiserror::Error;

/// Main error type for the RC-Nx bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O failure on the byte stream
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The peer closed the byte stream
    #[error("Transport closed by peer")]
    ConnectionClosed,

    /// No bytes arrived within the read retry budget
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// Magic byte not found within bound, or declared length inconsistent
    #[error("Framing error: {0}")]
    Framing(String),

    /// Header or frame checksum mismatch
    #[error("Checksum error: {0}")]
    Checksum(String),

    /// Frame is valid but its contents are not what the message requires
    #[error("Decode error: {0}")]
    Decode(String),

    /// Payload does not fit the 10-bit length field
    #[error("Payload of {len} bytes exceeds maximum {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Virtual output device update failed
    #[error("Output driver error: {0}")]
    Driver(String),

    /// Serial port could not be opened
    #[error("Serial port not found: {0}")]
    SerialPortNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl BridgeError {
    /// Whether a polling loop should log this error and keep going.
    ///
    /// Only a closed transport and configuration problems are terminal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            BridgeError::ConnectionClosed | BridgeError::Config(_) | BridgeError::SerialPortNotFound(_)
        )
    }
}

/// Result type alias for the RC-Nx bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
