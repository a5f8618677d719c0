//! Error types for image-sorter operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for image-sorter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, reviewing, or exporting images.
///
/// Invalid review operations (deciding after completion, undoing at the
/// first item) are not errors; the session reports them as ignored.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The resolved item list was empty, so no review can start.
    #[error("No images to review")]
    NothingToReview,

    /// The image manifest could not be read or parsed.
    #[error("Manifest error: {path}: {reason}")]
    Manifest {
        /// Path to the manifest or directory.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// An uploaded blob handle was unknown or already released.
    #[error("Blob error: {0}")]
    Blob(String),

    /// An item could not be rendered.
    #[error("Display failed for {reference}: {reason}")]
    Display {
        /// Reference of the item that failed.
        reference: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Error writing export artifacts.
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// A key token that does not name any known key.
    #[error("Unknown key: {0:?}")]
    UnknownKey(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
