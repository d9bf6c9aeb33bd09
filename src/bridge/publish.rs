//! Gamepad publishing loop: copy the latest axis snapshot to the output sink
//! on a fixed interval.

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::BridgeSettings;
use crate::controller::output::{apply_state, OutputSink};
use crate::controller::state::AxisState;

/// Run the publish loop until `cancel` fires, then centre and release the sink
pub(crate) async fn run_publish_loop<S: OutputSink>(
    mut sink: S,
    axes: watch::Receiver<AxisState>,
    settings: BridgeSettings,
    cancel: CancellationToken,
) {
    info!("Gamepad publish loop started");

    let mut ticker = tokio::time::interval(settings.publish_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut driver_errors = 0u64;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let state = *axes.borrow();
                if let Err(e) = apply_state(&mut sink, &state, settings.dial_threshold) {
                    driver_errors += 1;
                    warn!("Failed to update gamepad state: {}", e);
                }
            }
        }
    }

    if let Err(e) = apply_state(&mut sink, &AxisState::NEUTRAL, settings.dial_threshold) {
        warn!("Failed to release gamepad: {}", e);
    }
    drop(sink);

    info!("Gamepad publish loop stopped ({} driver errors)", driver_errors);
}
