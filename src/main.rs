//! # RC-Nx Bridge
//!
//! Use a DJI RC-N1/RC-N2 remote controller as a virtual gamepad.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (file, then command line overrides)
//!    - Set up logging
//!
//! 2. **Session**
//!    - Open the controller's serial port and the virtual gamepad
//!    - Poll stick telemetry and publish it to the gamepad until Ctrl+C
//!
//! 3. **Graceful Shutdown**
//!    - Cancel both loops, centre and release the gamepad, close the port
//!
//! Run the application:
//! ```bash
//! rc-nx-bridge --config config/default.toml --port /dev/ttyACM0
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use rc_nx_bridge::bridge::Bridge;
use rc_nx_bridge::config::{Config, OutputBackend};
use rc_nx_bridge::logging;
use rc_nx_bridge::serial::SerialConnector;

#[derive(Parser, Debug)]
#[command(name = "rc-nx-bridge", version, about = "DJI RC-N1/RC-N2 to virtual gamepad bridge")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", env = "RC_NX_CONFIG")]
    config: Option<PathBuf>,

    /// Serial port of the remote controller, overrides the configuration
    #[arg(short, long, value_name = "PORT", env = "RC_NX_PORT")]
    port: Option<String>,

    /// Log gamepad state instead of creating a virtual device
    #[arg(long)]
    dry_run: bool,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(port) = &cli.port {
        config.serial.port = port.clone();
    }
    if cli.dry_run {
        config.output.backend = OutputBackend::Log;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _log_guard = logging::init(&config.logging);

    info!("RC-Nx Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let connector = SerialConnector::new(config.serial.clone(), config.output.clone());
    let mut bridge = Bridge::new(connector, config.bridge_settings());

    bridge
        .start()
        .await
        .with_context(|| format!("failed to start bridge on {}", config.serial.port))?;
    info!("Press Ctrl+C to exit");

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;
    info!("Received Ctrl+C, shutting down...");

    bridge.stop().await;
    Ok(())
}
