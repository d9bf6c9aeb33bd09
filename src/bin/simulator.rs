//! # RC-Nx Simulator
//!
//! Pretends to be a DJI remote controller on a serial port so the bridge can
//! be tested without hardware. Pair it with the bridge through a virtual
//! null-modem cable (e.g. `socat` or com0com):
//!
//! ```bash
//! socat -d -d pty,raw,echo=0,link=/tmp/rc-host pty,raw,echo=0,link=/tmp/rc-device
//! rc-nx-simulator --port /tmp/rc-device --verbose
//! rc-nx-bridge --port /tmp/rc-host
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use rc_nx_bridge::config::LoggingConfig;
use rc_nx_bridge::logging;
use rc_nx_bridge::serial::{open_port, DUML_BAUD_RATE};
use rc_nx_bridge::simulator::Simulator;

#[derive(Parser, Debug)]
#[command(name = "rc-nx-simulator", version, about = "DJI RC-N1 remote controller simulator")]
struct Cli {
    /// Serial port to serve the bridge on
    #[arg(short, long, value_name = "PORT")]
    port: String,

    /// Line speed
    #[arg(short, long, default_value_t = DUML_BAUD_RATE)]
    baud_rate: u32,

    /// Log every request
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(&LoggingConfig {
        level: if cli.verbose { "debug" } else { "info" }.to_string(),
        file: None,
    });

    info!("RC-Nx Simulator v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = open_port(&cli.port, cli.baud_rate).with_context(|| format!("failed to open {}", cli.port))?;
    let simulator = Simulator::new().with_verbose(cli.verbose);
    let cancel = CancellationToken::new();

    let mut server = tokio::spawn({
        let simulator = simulator.clone();
        let cancel = cancel.clone();
        async move { simulator.run(port, cancel).await }
    });

    info!("Simulating remote controller on {}, press Ctrl+C to exit", cli.port);
    let interrupted = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            true
        }
        finished = &mut server => {
            finished.context("simulator task failed")??;
            false
        }
    };

    if interrupted {
        info!("Received Ctrl+C, shutting down...");
        cancel.cancel();
        server.await.context("simulator task failed")??;
    }
    info!("Fast mode was {}", if simulator.fast_mode() { "enabled" } else { "never enabled" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_is_required() {
        assert!(Cli::try_parse_from(["rc-nx-simulator"]).is_err());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["rc-nx-simulator", "--port", "COM2", "--verbose"]).unwrap();
        assert_eq!(cli.port, "COM2");
        assert_eq!(cli.baud_rate, 115_200);
        assert!(cli.verbose);
    }
}
