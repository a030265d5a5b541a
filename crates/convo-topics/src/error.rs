//! Topic error types.

use thiserror::Error;

/// Errors that can occur during clustering and labeling.
#[derive(Debug, Error)]
pub enum TopicsError {
    /// Embeddings of different lengths in one batch
    #[error("Dimension mismatch at row {index}: expected {expected}, got {actual}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
