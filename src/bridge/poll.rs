//! Telemetry polling loop: one request, one response, repeat.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::BridgeSettings;
use crate::controller::state::AxisState;
use crate::duml::decoder::parse_frame;
use crate::duml::link::DumlLink;
use crate::duml::protocol::{CMD_CHANNEL_VALUES, CMD_SIMULATOR_MODE, SIMULATOR_MODE_ON, TELEMETRY_FRAME_LEN};
use crate::duml::telemetry::decode_channels;
use crate::error::{BridgeError, Result};
use crate::serial::Transport;

/// Request telemetry and decode the response
///
/// Returns `Ok(None)` for frames that are not stick telemetry. A frame that
/// fails to parse is handed back to the reader so its bytes are rescanned on
/// the next exchange.
pub(crate) async fn poll_once<T: Transport>(link: &mut DumlLink<T>) -> Result<Option<AxisState>> {
    link.send(CMD_CHANNEL_VALUES, &[]).await?;

    let raw = link.next_frame().await?;
    let frame = match parse_frame(&raw) {
        Ok(frame) => frame,
        Err(e) => {
            link.reject_frame();
            return Err(e);
        }
    };

    if raw.len() != TELEMETRY_FRAME_LEN {
        trace!("Ignoring {}-byte frame", raw.len());
        return Ok(None);
    }

    let channels = decode_channels(frame.payload)?;
    Ok(Some(AxisState::from_raw(&channels)))
}

/// Run the poll loop until `cancel` fires
///
/// Failed exchanges leave the published state untouched and back off
/// according to the retry policy.
pub(crate) async fn run_poll_loop<T: Transport>(
    mut link: DumlLink<T>,
    axes: Arc<watch::Sender<AxisState>>,
    settings: BridgeSettings,
    cancel: CancellationToken,
) {
    info!("Telemetry poll loop started");

    if settings.fast_mode {
        match link.send(CMD_SIMULATOR_MODE, &SIMULATOR_MODE_ON).await {
            Ok(()) => debug!("Requested fast telemetry mode"),
            Err(e) => warn!("Failed to enable fast telemetry mode: {}", e),
        }
    }

    let mut failures = 0u32;
    let mut updates = 0u64;

    loop {
        // An exchange in flight is abandoned on cancellation
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = poll_once(&mut link) => outcome,
        };

        let pause = match outcome {
            Ok(Some(state)) => {
                axes.send_replace(state);
                updates += 1;
                failures = 0;
                settings.poll_interval
            }
            Ok(None) => settings.poll_interval,
            Err(e) => {
                failures = failures.saturating_add(1);
                let delay = settings.retry.delay(failures);
                match e {
                    BridgeError::Timeout(_) => debug!("No telemetry response ({} in a row): {}", failures, e),
                    ref e if !e.is_recoverable() => error!("Telemetry exchange failed, retrying in {:?}: {}", delay, e),
                    ref e => warn!("Telemetry exchange failed ({} in a row), retrying in {:?}: {}", failures, delay, e),
                }
                delay
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(pause) => {}
        }
    }

    info!("Telemetry poll loop stopped after {} updates", updates);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::mapping::{RAW_CENTER, RAW_MAX, RAW_MIN};
    use crate::duml::encoder::build_frame;
    use crate::duml::link::SequenceCounter;
    use crate::duml::protocol::*;
    use crate::duml::reader::FrameReaderConfig;
    use crate::duml::telemetry::{encode_channels, RawChannels};
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    fn host_link(stream: DuplexStream) -> DumlLink<DuplexStream> {
        DumlLink::new(
            stream,
            FrameReaderConfig::default(),
            SequenceCounter::new(TRANSLATOR_SEQUENCE_SEED),
            ADDR_HOST,
            ADDR_REMOTE_CONTROLLER,
        )
    }

    fn telemetry_frame(channels: &RawChannels) -> Vec<u8> {
        build_frame(
            SIMULATOR_SEQUENCE_SEED,
            ADDR_REMOTE_CONTROLLER,
            ADDR_HOST,
            CMD_CHANNEL_VALUES,
            &encode_channels(channels),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_poll_once_decodes_telemetry() {
        let (host, mut device) = tokio::io::duplex(1024);
        let mut link = host_link(host);

        let channels = RawChannels {
            right_horizontal: RAW_MAX,
            right_vertical: RAW_MIN,
            left_horizontal: RAW_CENTER,
            left_vertical: RAW_CENTER,
            camera_dial: RAW_MAX,
        };
        device.write_all(&telemetry_frame(&channels)).await.unwrap();

        let state = poll_once(&mut link).await.unwrap().unwrap();
        assert_eq!(state.right_horizontal, i16::MAX);
        assert_eq!(state.right_vertical, i16::MIN);
        assert_eq!(state.left_horizontal, 0);
        assert_eq!(state.camera_dial, i16::MAX);

        let mut request = [0u8; 13];
        device.read_exact(&mut request).await.unwrap();
        assert_eq!(request, [0x55, 0x0d, 0x04, 0x33, 0x0a, 0x06, 0xeb, 0x34, 0x40, 0x06, 0x01, 0x74, 0x24]);
    }

    #[tokio::test]
    async fn test_poll_once_ignores_other_frames() {
        let (host, mut device) = tokio::io::duplex(1024);
        let mut link = host_link(host);

        let ack = build_frame(1, ADDR_REMOTE_CONTROLLER, ADDR_HOST, CMD_SIMULATOR_MODE, &[0x00]).unwrap();
        device.write_all(&ack).await.unwrap();

        assert_eq!(poll_once(&mut link).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_poll_once_rejects_corrupt_telemetry() {
        let (host, mut device) = tokio::io::duplex(1024);
        let mut link = host_link(host);

        let mut frame = telemetry_frame(&AxisState::NEUTRAL.to_raw());
        frame[20] ^= 0x10;
        device.write_all(&frame).await.unwrap();

        assert!(matches!(poll_once(&mut link).await, Err(BridgeError::Checksum(_))));
    }

    #[tokio::test]
    async fn test_poll_once_recovers_frame_behind_noise() {
        let (host, mut device) = tokio::io::duplex(1024);
        let mut link = host_link(host);

        let channels = RawChannels {
            left_vertical: RAW_MAX,
            ..AxisState::NEUTRAL.to_raw()
        };
        let mut stream = vec![0x00, DUML_MAGIC, 0x0e, 0x00, 0x00];
        stream.extend_from_slice(&telemetry_frame(&channels));
        device.write_all(&stream).await.unwrap();

        assert!(matches!(poll_once(&mut link).await, Err(BridgeError::Checksum(_))));

        let state = poll_once(&mut link).await.unwrap().unwrap();
        assert_eq!(state.left_vertical, i16::MAX);
        assert_eq!(state.right_horizontal, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_keeps_state_on_failure_and_stops_on_cancel() {
        let (host, mut device) = tokio::io::duplex(4096);
        let link = host_link(host);

        let known = AxisState {
            left_vertical: 9930,
            ..AxisState::NEUTRAL
        };
        let (tx, rx) = watch::channel(known);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_poll_loop(
            link,
            Arc::new(tx),
            BridgeSettings::default(),
            cancel.clone(),
        ));

        // Answer nothing, then reply with a corrupted frame
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        let mut frame = telemetry_frame(&RawChannels {
            right_horizontal: RAW_MAX,
            ..AxisState::NEUTRAL.to_raw()
        });
        frame[37] ^= 0xFF;
        device.write_all(&frame).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        assert_eq!(*rx.borrow(), known);

        cancel.cancel();
        task.await.unwrap();

        // Fast mode request went out first
        let mut first = [0u8; 14];
        device.read_exact(&mut first).await.unwrap();
        assert_eq!(&first[8..11], &[0x40, 0x06, 0x24]);
    }
}
