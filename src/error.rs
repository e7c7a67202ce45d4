//! Error types for the searchlens application.

/// Top-level error type for the searchlens CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file missing, unreadable, or invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Search, dispatch, or comparison error.
    #[error(transparent)]
    Search(#[from] searchlens_compare::SearchError),

    /// Output formatting error.
    #[error("render error: {0}")]
    Render(String),

    /// Logging setup error.
    #[error("logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
