//! Centralized application directory paths for searchlens.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Data (logs) | `~/Library/Application Support/searchlens/` | `~/.local/share/searchlens/` |
//! | Config | `~/Library/Application Support/searchlens/` | `~/.config/searchlens/` |
//!
//! # Environment Overrides
//!
//! - `SEARCHLENS_DATA_DIR` overrides [`data_dir`]
//! - `SEARCHLENS_CONFIG_DIR` overrides [`config_dir`]

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "searchlens";

/// Application data root directory. Holds the `logs/` directory.
///
/// Resolves to `dirs::data_dir()/searchlens/` by default. Override with
/// the `SEARCHLENS_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("SEARCHLENS_DATA_DIR"),
        dirs::data_dir(),
        "/tmp/searchlens-data",
    )
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/searchlens/` by default. Override with
/// the `SEARCHLENS_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var_os("SEARCHLENS_CONFIG_DIR"),
        dirs::config_dir(),
        "/tmp/searchlens-config",
    )
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

fn resolve(
    override_dir: Option<OsString>,
    platform_dir: Option<PathBuf>,
    fallback: &str,
) -> PathBuf {
    if let Some(dir) = override_dir {
        return PathBuf::from(dir);
    }
    platform_dir
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| Path::new(fallback).to_path_buf())
}
