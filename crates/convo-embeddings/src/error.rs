//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Candle model error
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model file missing or unreadable
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to download model: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model returned a different number of vectors than texts
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}
