//! # Serial Communication Module
//!
//! Handles the serial link to the DJI remote controller.
//!
//! This module handles:
//! - Opening the controller's serial port (115200 baud, 8N1)
//! - The [`Transport`] bound every byte stream must satisfy
//! - [`SerialConnector`], which acquires the serial port and the gamepad
//!   output for each bridge session

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

use crate::bridge::Connector;
use crate::config::{OutputBackend, OutputConfig, SerialConfig};
use crate::controller::output::{LogSink, OutputSink};
use crate::error::{BridgeError, Result};

/// Baud rate of the RC-N1 USB serial interface
pub const DUML_BAUD_RATE: u32 = 115_200;

/// Any byte stream a DUML link can run over
///
/// Implemented for every `AsyncRead + AsyncWrite + Unpin + Send` type, so a
/// `tokio_serial::SerialStream` and a `tokio::io::DuplexStream` both qualify.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Open a serial port with DUML settings
///
/// # Arguments
///
/// * `path` - Device path (e.g., "/dev/ttyACM0" or "COM3")
/// * `baud_rate` - Line speed, normally [`DUML_BAUD_RATE`]
///
/// # Returns
///
/// * `Result<SerialStream>` - Opened serial port
///
/// # Errors
///
/// Returns `SerialPortNotFound` if the device cannot be opened
///
/// # Examples
///
/// ```no_run
/// use rc_nx_bridge::serial::{open_port, DUML_BAUD_RATE};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let port = open_port("/dev/ttyACM0", DUML_BAUD_RATE)?;
///     Ok(())
/// }
/// ```
pub fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
    debug!("Opening serial port {} at {} baud", path, baud_rate);

    let port = tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(|e| BridgeError::SerialPortNotFound(format!("{}: {}", path, e)))?;

    info!("Opened serial port {}", path);
    Ok(port)
}

/// Production connector: a serial port plus the configured gamepad backend
#[derive(Debug, Clone)]
pub struct SerialConnector {
    serial: SerialConfig,
    output: OutputConfig,
}

impl SerialConnector {
    pub fn new(serial: SerialConfig, output: OutputConfig) -> Self {
        Self { serial, output }
    }
}

#[async_trait]
impl Connector for SerialConnector {
    type Port = tokio_serial::SerialStream;
    type Output = Box<dyn OutputSink>;

    async fn open_transport(&self) -> Result<Self::Port> {
        open_port(&self.serial.port, self.serial.baud_rate)
    }

    fn open_output(&self) -> Result<Self::Output> {
        open_output(&self.output)
    }
}

/// Create the gamepad output selected by `config`
///
/// # Errors
///
/// Returns `Driver` if the uinput device cannot be created, or if the uinput
/// backend is requested on a platform without uinput.
pub fn open_output(config: &OutputConfig) -> Result<Box<dyn OutputSink>> {
    match config.backend {
        OutputBackend::Log => Ok(Box::new(LogSink::new())),
        #[cfg(target_os = "linux")]
        OutputBackend::Uinput => {
            let gamepad = crate::controller::uinput::UinputGamepad::create(&config.device_name)?;
            Ok(Box::new(gamepad))
        }
        #[cfg(not(target_os = "linux"))]
        OutputBackend::Uinput => Err(BridgeError::Driver(
            "uinput output is only available on Linux".to_string(),
        )),
    }
}
