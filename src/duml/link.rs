//! # DUML Link
//!
//! One endpoint of a DUML conversation: owns the transport, the frame reader
//! and the endpoint's sequence counter.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use super::encoder::build_frame;
use super::protocol::Command;
use super::reader::{FrameReader, FrameReaderConfig};
use crate::error::Result;

/// Per-endpoint sequence counter, wrapping at 16 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter(u16);

impl SequenceCounter {
    pub fn new(seed: u16) -> Self {
        Self(seed)
    }

    /// Sequence number the next frame will carry
    pub fn current(&self) -> u16 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// A DUML endpoint bound to a byte stream
pub struct DumlLink<T> {
    reader: FrameReader<T>,
    sequence: SequenceCounter,
    source: u8,
    target: u8,
}

impl<T> std::fmt::Debug for DumlLink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumlLink")
            .field("sequence", &self.sequence)
            .field("source", &format_args!("0x{:02X}", self.source))
            .field("target", &format_args!("0x{:02X}", self.target))
            .finish_non_exhaustive()
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> DumlLink<T> {
    /// Bind an endpoint with address `source` talking to `target`
    pub fn new(transport: T, config: FrameReaderConfig, sequence: SequenceCounter, source: u8, target: u8) -> Self {
        Self {
            reader: FrameReader::with_config(transport, config),
            sequence,
            source,
            target,
        }
    }

    /// Build and write one frame to the peer
    ///
    /// The sequence counter only advances once the frame has been written.
    pub async fn send(&mut self, command: Command, payload: &[u8]) -> Result<()> {
        let frame = build_frame(self.sequence.current(), self.source, self.target, command, payload)?;

        let port = self.reader.get_mut();
        port.write_all(&frame).await?;
        port.flush().await?;

        trace!(
            "Sent {:02X}/{:02X}/{:02X} seq=0x{:04X} ({} bytes)",
            command.cmd_type,
            command.cmd_set,
            command.cmd_id,
            self.sequence.current(),
            frame.len()
        );
        self.sequence.advance();
        Ok(())
    }

    /// Read the next raw frame from the peer
    pub async fn next_frame(&mut self) -> Result<Bytes> {
        self.reader.next_frame().await
    }

    /// Return the last frame to the reader because it failed to parse
    ///
    /// See [`FrameReader::reject_last`].
    pub fn reject_frame(&mut self) {
        self.reader.reject_last();
    }

    pub fn sequence(&self) -> SequenceCounter {
        self.sequence
    }
}
