//! searchlens: compare lexical and semantic search rankings side by side.
//!
//! This crate is the application layer over [`searchlens_compare`]:
//!
//! - **Config**: TOML file with `[search]`, `[dataset]` and `[logging]`
//! - **Logging**: `tracing` to stderr, optionally to a log file
//! - **Commands**: one-shot compare, dataset listing, interactive session
//! - **Render**: result panes with rank-change markers, or JSON

pub mod commands;
pub mod config;
pub mod error;
pub mod lens_dirs;
pub mod logging;
pub mod render;

pub use config::{AppConfig, DatasetConfig, LoggingConfig};
pub use error::{AppError, Result};
