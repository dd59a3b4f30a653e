//! CLI error types

use thiserror::Error;

/// Errors raised by the `neutryx-hw` host.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Offending path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Request or result JSON could not be (de)serialised
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file or environment overrides are malformed
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The text summary could not be rendered
    #[error("Report formatting failed: {0}")]
    Format(#[from] std::fmt::Error),

    /// Request content is inconsistent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The orchestrator returned a failed result
    #[error("Calibration failed: {0}")]
    CalibrationFailed(String),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
