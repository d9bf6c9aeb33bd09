//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional; missing values fall back to
//! the defaults below.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bridge::retry::RetryPolicy;
use crate::bridge::BridgeSettings;
use crate::duml::reader::FrameReaderConfig;
use crate::error::{BridgeError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Per-read timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Idle reads tolerated before a frame read times out
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
}

/// Translation loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_publish_interval_ms")]
    pub publish_interval_ms: u64,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_retry_backoff_max_ms")]
    pub retry_backoff_max_ms: u64,

    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,

    #[serde(default = "default_dial_threshold")]
    pub dial_threshold: i16,

    #[serde(default = "default_fast_mode")]
    pub fast_mode: bool,
}

/// Gamepad output backend
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputBackend {
    /// Linux uinput virtual gamepad
    Uinput,
    /// Log state changes only
    Log,
}

/// Gamepad output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_backend")]
    pub backend: OutputBackend,

    #[serde(default = "default_device_name")]
    pub device_name: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file, written in addition to stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_timeout_ms() -> u64 { 100 }
fn default_read_retries() -> u32 { 3 }

fn default_poll_interval_ms() -> u64 { 10 }
fn default_publish_interval_ms() -> u64 { 100 }
fn default_retry_backoff_ms() -> u64 { 100 }
fn default_retry_backoff_max_ms() -> u64 { 1000 }
fn default_stop_grace_ms() -> u64 { 300 }
fn default_dial_threshold() -> i16 { 32000 }
fn default_fast_mode() -> bool { true }

fn default_output_backend() -> OutputBackend { OutputBackend::Uinput }
fn default_device_name() -> String { "DJI RC-N1 Gamepad".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            read_retries: default_read_retries(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            publish_interval_ms: default_publish_interval_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_max_ms: default_retry_backoff_max_ms(),
            stop_grace_ms: default_stop_grace_ms(),
            dial_threshold: default_dial_threshold(),
            fast_mode: default_fast_mode(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backend: default_output_backend(),
            device_name: default_device_name(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn invalid(message: impl std::fmt::Display) -> BridgeError {
    BridgeError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rc_nx_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if self.serial.baud_rate == 0 {
            return Err(invalid("baud_rate must be greater than 0"));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if self.serial.read_retries == 0 || self.serial.read_retries > 100 {
            return Err(invalid("read_retries must be between 1 and 100"));
        }

        for (name, value) in [
            ("poll_interval_ms", self.bridge.poll_interval_ms),
            ("publish_interval_ms", self.bridge.publish_interval_ms),
            ("retry_backoff_ms", self.bridge.retry_backoff_ms),
            ("retry_backoff_max_ms", self.bridge.retry_backoff_max_ms),
            ("stop_grace_ms", self.bridge.stop_grace_ms),
        ] {
            if value == 0 || value > 60000 {
                return Err(invalid(format!("{} must be between 1 and 60000", name)));
            }
        }

        if self.bridge.retry_backoff_ms > self.bridge.retry_backoff_max_ms {
            return Err(invalid("retry_backoff_ms must not exceed retry_backoff_max_ms"));
        }

        if self.bridge.dial_threshold < 0 {
            return Err(invalid("dial_threshold must be between 0 and 32767"));
        }

        if self.output.device_name.is_empty() {
            return Err(invalid("output device_name cannot be empty"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(invalid(format!(
                "logging level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Session settings derived from the `[serial]` and `[bridge]` sections
    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            reader: FrameReaderConfig {
                read_timeout: Duration::from_millis(self.serial.timeout_ms),
                read_retries: self.serial.read_retries,
                ..FrameReaderConfig::default()
            },
            poll_interval: Duration::from_millis(self.bridge.poll_interval_ms),
            publish_interval: Duration::from_millis(self.bridge.publish_interval_ms),
            retry: RetryPolicy {
                initial: Duration::from_millis(self.bridge.retry_backoff_ms),
                max: Duration::from_millis(self.bridge.retry_backoff_max_ms),
            },
            stop_grace: Duration::from_millis(self.bridge.stop_grace_ms),
            dial_threshold: self.bridge.dial_threshold,
            fast_mode: self.bridge.fast_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.output.backend, OutputBackend::Uinput);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_default_settings_match_bridge_defaults() {
        let settings = Config::default().bridge_settings();
        let expected = BridgeSettings::default();

        assert_eq!(settings.reader, expected.reader);
        assert_eq!(settings.poll_interval, expected.poll_interval);
        assert_eq!(settings.publish_interval, expected.publish_interval);
        assert_eq!(settings.retry, expected.retry);
        assert_eq!(settings.stop_grace, expected.stop_grace);
        assert_eq!(settings.dial_threshold, expected.dial_threshold);
        assert_eq!(settings.fast_mode, expected.fast_mode);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.bridge.dial_threshold, 32000);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
[serial]
port = "COM3"

[bridge]
fast_mode = false
publish_interval_ms = 20

[output]
backend = "log"
"#,
        )
        .unwrap();

        assert_eq!(config.serial.port, "COM3");
        assert_eq!(config.serial.timeout_ms, 100);
        assert!(!config.bridge.fast_mode);
        assert_eq!(config.output.backend, OutputBackend::Log);

        let settings = config.bridge_settings();
        assert_eq!(settings.publish_interval, Duration::from_millis(20));
        assert_eq!(settings.poll_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyUSB0"

[bridge]

[output]
device_name = "Test Pad"

[logging]
level = "debug"
file = "/tmp/rc-nx-bridge.log"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.output.device_name, "Test Pad");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/rc-nx-bridge.log")));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/rc-nx-bridge.toml");
        assert!(matches!(result, Err(BridgeError::Transport(_))));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = Config::from_toml("[output]\nbackend = \"joystick\"\n");
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_ms_zero() {
        let mut config = Config::default();
        config.serial.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_read_retries_zero() {
        let mut config = Config::default();
        config.serial.read_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_too_high() {
        let mut config = Config::default();
        config.bridge.poll_interval_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_publish_interval_zero() {
        let mut config = Config::default();
        config.bridge.publish_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_above_cap() {
        let mut config = Config::default();
        config.bridge.retry_backoff_ms = 2000;
        config.bridge.retry_backoff_max_ms = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_dial_threshold() {
        let mut config = Config::default();
        config.bridge.dial_threshold = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_device_name() {
        let mut config = Config::default();
        config.output.device_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();
        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
