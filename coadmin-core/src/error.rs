//! Error types for coadmin-core

use thiserror::Error;

/// Main error type for the coadmin-core library
///
/// A throttled report is not an error; see [`crate::issues::Submission::Suppressed`].
#[derive(Error, Debug)]
pub enum Error {
    /// IO error (writing an issue file, creating log directories)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Collector/API error
    #[error("collector error: {0}")]
    Collector(String),

    /// Unknown issue level
    #[error("invalid issue level '{0}' (expected fatal, error, warning, info or debug)")]
    InvalidLevel(String),
}

/// Result type alias for coadmin-core
pub type Result<T> = std::result::Result<T, Error>;
