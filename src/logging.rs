//! # Logging
//!
//! Installs the global `tracing` subscriber: human readable output on stderr
//! and, optionally, a copy of every event in a log file.
//!
//! `RUST_LOG` takes precedence over the configured level.

use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber
///
/// # Returns
///
/// The file writer's guard when a log file is configured. Keep it alive for
/// the lifetime of the program; dropping it flushes and closes the file.
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let (file_layer, guard, rejected) = match config.file.as_deref() {
        Some(path) => match file_writer(path) {
            Some((writer, guard)) => (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
                None,
            ),
            None => (None, None, Some(path)),
        },
        None => (None, None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if let Some(path) = rejected {
        warn!("Log file path {} has no file name, logging to stderr only", path.display());
    }

    guard
}

fn file_writer(path: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path.file_name()?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let appender = tracing_appender::rolling::never(directory, file_name);
    Some(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_writer_requires_file_name() {
        assert!(file_writer(Path::new("/")).is_none());
    }

    #[test]
    fn test_file_writer_creates_log_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.log");

        let (writer, guard) = file_writer(&path).unwrap();
        drop(writer);
        drop(guard);

        assert!(path.exists());
    }
}
