//! Tracing subscriber setup for the searchlens binary.
//!
//! Logs always go to stderr so stdout stays clean for rendered results and
//! `--json` output. When `[logging] file = true`, a second non-blocking layer
//! appends to `<data dir>/logs/searchlens.log`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;
use crate::error::{AppError, Result};

/// Log file name inside the logs directory.
pub const LOG_FILE_NAME: &str = "searchlens.log";

/// Filter directive used when `RUST_LOG` is unset.
///
/// Dependencies stay at `warn`; both searchlens crates log at `level`.
pub fn default_directive(level: &str) -> String {
    let level = level.trim();
    let level = if level.is_empty() { "info" } else { level };
    format!("warn,searchlens={level},searchlens_compare={level}")
}

/// Install the global subscriber.
///
/// Returns the appender guard when file logging is on; keep it alive for
/// the life of the process or buffered lines are lost.
///
/// # Errors
///
/// Returns [`AppError::Logging`] if the log directory cannot be created or
/// a global subscriber is already installed.
pub fn init(config: &LoggingConfig, logs_dir: &Path) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

    let (file_layer, guard) = if config.file {
        std::fs::create_dir_all(logs_dir).map_err(|e| {
            AppError::Logging(format!("cannot create {}: {e}", logs_dir.display()))
        })?;
        let appender = tracing_appender::rolling::never(logs_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(guard)
}
