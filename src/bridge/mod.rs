//! # Bridge Module
//!
//! Runs a translation session: a poll loop that keeps the axis snapshot up to
//! date over the DUML link, and a publish loop that pushes the snapshot to the
//! gamepad output.
//!
//! ## Session Lifecycle
//!
//! 1. `start()` opens a fresh transport and output device through the
//!    [`Connector`] and spawns both loops with a new cancellation token.
//! 2. The loops share nothing but the axis snapshot (a `watch` channel).
//! 3. `stop()` cancels the token, waits up to the grace period, aborts
//!    stragglers and resets the snapshot to neutral. Each loop owns its
//!    resource, so ending the loop releases it.

pub mod retry;
mod poll;
mod publish;

use async_trait::async_trait;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::controller::output::{OutputSink, DEFAULT_DIAL_THRESHOLD};
use crate::controller::state::AxisState;
use crate::duml::link::{DumlLink, SequenceCounter};
use crate::duml::protocol::{ADDR_HOST, ADDR_REMOTE_CONTROLLER, TRANSLATOR_SEQUENCE_SEED};
use crate::duml::reader::FrameReaderConfig;
use crate::error::Result;
use crate::serial::Transport;
use retry::RetryPolicy;

/// Acquires the resources of one session
#[async_trait]
pub trait Connector: Send + Sync {
    type Port: Transport + 'static;
    type Output: OutputSink + 'static;

    /// Open the byte stream to the remote controller
    async fn open_transport(&self) -> Result<Self::Port>;

    /// Create the gamepad output device
    fn open_output(&self) -> Result<Self::Output>;
}

/// Timing and behaviour of a session
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub reader: FrameReaderConfig,
    /// Pause after a completed exchange
    pub poll_interval: Duration,
    pub publish_interval: Duration,
    pub retry: RetryPolicy,
    /// How long `stop()` waits for the loops before aborting them
    pub stop_grace: Duration,
    pub dial_threshold: i16,
    /// Ask the controller for fast telemetry when the session starts
    pub fast_mode: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            reader: FrameReaderConfig::default(),
            poll_interval: Duration::from_millis(10),
            publish_interval: Duration::from_millis(100),
            retry: RetryPolicy::default(),
            stop_grace: Duration::from_millis(300),
            dial_threshold: DEFAULT_DIAL_THRESHOLD,
            fast_mode: true,
        }
    }
}

struct Session {
    cancel: CancellationToken,
    poll: JoinHandle<()>,
    publish: JoinHandle<()>,
}

/// Translation engine with start/stop session control
pub struct Bridge<C: Connector> {
    connector: C,
    settings: BridgeSettings,
    axes: Arc<watch::Sender<AxisState>>,
    session: Option<Session>,
}

impl<C: Connector> std::fmt::Debug for Bridge<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("settings", &self.settings)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<C: Connector> Bridge<C> {
    pub fn new(connector: C, settings: BridgeSettings) -> Self {
        let (axes, _) = watch::channel(AxisState::NEUTRAL);
        Self {
            connector,
            settings,
            axes: Arc::new(axes),
            session: None,
        }
    }

    /// Open resources and start both loops
    ///
    /// Does nothing if a session is already running.
    ///
    /// # Errors
    ///
    /// Returns the connector's error if the transport or output device cannot
    /// be opened. Anything acquired before the failure is released.
    pub async fn start(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("Bridge already running");
            return Ok(());
        }

        info!("Starting bridge session");
        let port = self.connector.open_transport().await?;
        let output = self.connector.open_output()?;

        let link = DumlLink::new(
            port,
            self.settings.reader,
            SequenceCounter::new(TRANSLATOR_SEQUENCE_SEED),
            ADDR_HOST,
            ADDR_REMOTE_CONTROLLER,
        );

        let cancel = CancellationToken::new();
        let poll = supervise(
            "poll",
            poll::run_poll_loop(link, self.axes.clone(), self.settings.clone(), cancel.clone()),
        );
        let publish = supervise(
            "publish",
            publish::run_publish_loop(output, self.axes.subscribe(), self.settings.clone(), cancel.clone()),
        );

        self.session = Some(Session { cancel, poll, publish });
        info!("Bridge running");
        Ok(())
    }

    /// Stop both loops, release resources and reset the axes to neutral
    ///
    /// Does nothing if no session is running.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("Bridge already stopped");
            return;
        };

        info!("Stopping bridge session");
        session.cancel.cancel();

        let grace = self.settings.stop_grace;
        tokio::join!(
            join_with_grace("poll", session.poll, grace),
            join_with_grace("publish", session.publish, grace),
        );

        self.axes.send_replace(AxisState::NEUTRAL);
        info!("Bridge stopped");
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Current axis snapshot
    pub fn axes(&self) -> AxisState {
        *self.axes.borrow()
    }

    /// Receiver notified on every axis update
    pub fn subscribe(&self) -> watch::Receiver<AxisState> {
        self.axes.subscribe()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: Connector> Drop for Bridge<C> {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            session.cancel.cancel();
        }
    }
}

/// Spawn a loop so that a panic inside it is logged instead of propagating
fn supervise<F>(name: &'static str, task: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic) = AssertUnwindSafe(task).catch_unwind().await {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            error!(task = name, "{} loop panicked: {}", name, reason);
        }
    })
}

async fn join_with_grace(name: &str, mut handle: JoinHandle<()>, grace: Duration) {
    match tokio::time::timeout(grace, &mut handle).await {
        Ok(Ok(())) => debug!("{} loop finished", name),
        Ok(Err(e)) => warn!("{} loop ended abnormally: {}", name, e),
        Err(_) => {
            warn!("{} loop did not stop within {:?}, aborting", name, grace);
            handle.abort();
            let _ = handle.await;
        }
    }
}
