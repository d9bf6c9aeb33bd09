//! # DUML Frame Reader
//!
//! Recovers frame boundaries from an undelimited byte stream. The reader scans
//! for the magic byte, decodes the length from the header and waits until the
//! whole frame is buffered. Checksums are not inspected here; that is
//! [`parse_frame`](super::decoder::parse_frame)'s job.
//!
//! A stray magic byte in line noise can declare a length that reaches into
//! the real frame behind it. When the caller finds such a candidate invalid it
//! hands it back with [`FrameReader::reject_last`], and scanning restarts at
//! the byte after the false magic.

use bytes::{Buf, Bytes, BytesMut};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use super::decoder::declared_length;
use super::protocol::{DUML_MAGIC, DUML_MAX_FRAME_LEN, DUML_MIN_FRAME_LEN};
use crate::error::{BridgeError, Result};

const READ_CHUNK_SIZE: usize = 1024;

/// Frame reader tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReaderConfig {
    /// How long a single read may wait for bytes
    pub read_timeout: Duration,

    /// Consecutive idle reads allowed before `next_frame` gives up
    pub read_retries: u32,

    /// Bytes that may be discarded while hunting for a frame start
    pub max_scan: usize,
}

impl Default for FrameReaderConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(100),
            read_retries: 3,
            max_scan: 4096,
        }
    }
}

/// Reads complete DUML frames from any `AsyncRead` stream.
///
/// Bytes that arrive after a frame stay buffered for the next call, so
/// back-to-back frames delivered in one read are never lost.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameReaderConfig,
    /// Most recently returned frame, kept until the next read
    last: Option<Bytes>,
}

impl<T> std::fmt::Debug for FrameReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("buffered", &self.buf.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: AsyncRead + Unpin> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameReaderConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameReaderConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(DUML_MAX_FRAME_LEN + READ_CHUNK_SIZE),
            config,
            last: None,
        }
    }

    /// Read the next complete frame
    ///
    /// # Returns
    ///
    /// * `Result<Bytes>` - One frame, magic byte through trailing CRC
    ///
    /// # Errors
    ///
    /// - `Timeout` when the stream stays idle for the whole retry budget. The
    ///   magic byte of an incomplete frame is dropped so the next call
    ///   rescans from the following byte.
    /// - `Framing` when more than `max_scan` bytes were discarded without
    ///   finding a frame start.
    /// - `ConnectionClosed` at end of stream, `Transport` on I/O failure.
    pub async fn next_frame(&mut self) -> Result<Bytes> {
        let mut discarded = 0usize;
        let mut idle_reads = 0u32;
        self.last = None;

        loop {
            discarded += self.sync_to_magic();
            if discarded > self.config.max_scan {
                return Err(BridgeError::Framing(format!(
                    "No frame start within {} bytes",
                    self.config.max_scan
                )));
            }

            if let Some(length) = declared_length(&self.buf) {
                if length < DUML_MIN_FRAME_LEN {
                    trace!("Skipping false frame start declaring {} bytes", length);
                    self.buf.advance(1);
                    discarded += 1;
                    continue;
                }

                if self.buf.len() >= length {
                    if discarded > 0 {
                        debug!("Resynchronized after discarding {} bytes", discarded);
                    }
                    let frame = self.buf.split_to(length).freeze();
                    self.last = Some(frame.clone());
                    return Ok(frame);
                }
            }

            if self.fill().await? == 0 {
                idle_reads += 1;
                if idle_reads >= self.config.read_retries {
                    self.abandon_candidate();
                    return Err(BridgeError::Timeout(format!(
                        "frame after {} idle reads",
                        idle_reads
                    )));
                }
            } else {
                idle_reads = 0;
            }
        }
    }

    /// Hand back the frame returned by the last `next_frame` call
    ///
    /// Everything after its magic byte goes back to the front of the buffer,
    /// so the next call rescans those bytes instead of losing them. Does
    /// nothing if no frame has been returned since the last read.
    pub fn reject_last(&mut self) {
        let Some(last) = self.last.take() else {
            return;
        };

        trace!("Rescanning {} bytes of a rejected frame", last.len() - 1);
        let mut rebuilt = BytesMut::with_capacity(last.len() + self.buf.len() + READ_CHUNK_SIZE);
        rebuilt.extend_from_slice(&last[1..]);
        rebuilt.extend_from_slice(&self.buf);
        self.buf = rebuilt;
    }

    /// Drop bytes ahead of the first magic byte, returning how many went
    fn sync_to_magic(&mut self) -> usize {
        match self.buf.iter().position(|&b| b == DUML_MAGIC) {
            Some(0) => 0,
            Some(skip) => {
                self.buf.advance(skip);
                skip
            }
            None => {
                let skip = self.buf.len();
                self.buf.clear();
                skip
            }
        }
    }

    /// Give up on a partially received frame
    fn abandon_candidate(&mut self) {
        if self.buf.first() == Some(&DUML_MAGIC) {
            trace!("Abandoning incomplete frame ({} bytes buffered)", self.buf.len());
            self.buf.advance(1);
        }
    }

    /// Read more bytes; `Ok(0)` means nothing arrived within the timeout
    async fn fill(&mut self) -> Result<usize> {
        self.buf.reserve(READ_CHUNK_SIZE);

        match tokio::time::timeout(self.config.read_timeout, self.inner.read_buf(&mut self.buf)).await {
            Ok(Ok(0)) => Err(BridgeError::ConnectionClosed),
            Ok(Ok(n)) => Ok(n),
            Ok(Err(err)) if err.kind() == ErrorKind::Interrupted => Ok(0),
            Ok(Err(err)) => Err(BridgeError::Transport(err)),
            Err(_elapsed) => Ok(0),
        }
    }

    /// Number of bytes received but not yet returned as a frame
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
