//! Error types for export ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a chat export.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Export file could not be read
    #[error("Failed to read export {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export is not valid JSON or does not match the expected shape
    #[error("Invalid export JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Export parsed but has the wrong top-level structure
    #[error("Invalid export format: {0}")]
    InvalidFormat(String),
}
