//! # Remote Controller Simulator
//!
//! Plays the remote controller's side of the DUML link so the bridge can be
//! exercised without hardware, either over a virtual serial pair
//! (`rc-nx-simulator`) or over an in-memory stream in tests.
//!
//! The simulator answers every channel values request with a telemetry frame
//! built from [`motion::sample`], and records when the host switches on fast
//! telemetry mode.

pub mod motion;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::controller::state::AxisState;
use crate::duml::decoder::parse_frame;
use crate::duml::link::{DumlLink, SequenceCounter};
use crate::duml::protocol::{
    Frame, ADDR_HOST, ADDR_REMOTE_CONTROLLER, CMD_CHANNEL_VALUES, CMD_SIMULATOR_MODE, SIMULATOR_MODE_ON,
    SIMULATOR_SEQUENCE_SEED, TELEMETRY_PAYLOAD_LEN,
};
use crate::duml::reader::FrameReaderConfig;
use crate::duml::telemetry::encode_channels;
use crate::error::{BridgeError, Result};
use crate::serial::Transport;

/// Simulated DJI remote controller
#[derive(Debug, Clone)]
pub struct Simulator {
    origin: Instant,
    fast_mode: Arc<AtomicBool>,
    verbose: bool,
    reader: FrameReaderConfig,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// Create a simulator whose motion clock starts now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            fast_mode: Arc::new(AtomicBool::new(false)),
            verbose: false,
            reader: FrameReaderConfig::default(),
        }
    }

    /// Log every request at info level instead of debug
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_reader_config(mut self, reader: FrameReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    /// Whether the host has enabled fast telemetry mode
    ///
    /// Clones share this flag.
    pub fn fast_mode(&self) -> bool {
        self.fast_mode.load(Ordering::SeqCst)
    }

    /// Stick positions the simulator reports at `at`
    pub fn sample_at(&self, at: Instant) -> AxisState {
        motion::sample(at.saturating_duration_since(self.origin).as_secs_f64())
    }

    /// React to one validated frame from the host
    ///
    /// Returns the telemetry payload to send back, if the frame asks for one.
    pub fn handle_frame(&self, frame: &Frame<'_>) -> Option<[u8; TELEMETRY_PAYLOAD_LEN]> {
        if frame.command == CMD_CHANNEL_VALUES {
            let state = self.sample_at(Instant::now());
            if self.verbose {
                info!("Channel values request seq=0x{:04X}, replying {:?}", frame.sequence, state);
            } else {
                debug!("Channel values request seq=0x{:04X}", frame.sequence);
            }
            return Some(encode_channels(&state.to_raw()));
        }

        if frame.command == CMD_SIMULATOR_MODE {
            if frame.payload.first() == SIMULATOR_MODE_ON.first() {
                if !self.fast_mode.swap(true, Ordering::SeqCst) {
                    info!("Simulator mode enabled");
                }
            } else {
                debug!("Ignoring simulator mode payload {:02X?}", frame.payload);
            }
            return None;
        }

        debug!(
            "Ignoring command {:02X}/{:02X}/{:02X}",
            frame.command.cmd_type, frame.command.cmd_set, frame.command.cmd_id
        );
        None
    }

    /// Serve the host over `transport` until it disconnects or `cancel` fires
    ///
    /// Malformed frames are logged and dropped; read timeouts are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not recoverable by resynchronising,
    /// other than the host closing the stream.
    pub async fn run<T: Transport>(&self, transport: T, cancel: CancellationToken) -> Result<()> {
        let mut link = DumlLink::new(
            transport,
            self.reader,
            SequenceCounter::new(SIMULATOR_SEQUENCE_SEED),
            ADDR_REMOTE_CONTROLLER,
            ADDR_HOST,
        );
        info!("Simulator waiting for requests");

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break,
                next = link.next_frame() => next,
            };

            let raw = match next {
                Ok(raw) => raw,
                Err(BridgeError::Timeout(_)) => continue,
                Err(BridgeError::ConnectionClosed) => {
                    info!("Host closed the connection");
                    break;
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Read error: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let frame = match parse_frame(&raw) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Rescanning past malformed frame: {}", e);
                    link.reject_frame();
                    continue;
                }
            };

            if let Some(payload) = self.handle_frame(&frame) {
                if let Err(e) = link.send(CMD_CHANNEL_VALUES, &payload).await {
                    warn!("Failed to send telemetry: {}", e);
                }
            }
        }

        info!("Simulator stopped");
        Ok(())
    }
}
