//! Graph builder error types.

use thiserror::Error;

use convo_topics::TopicsError;
use convo_types::RecordId;

/// Errors that can occur while building a similarity graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Clustering or dimension validation error
    #[error(transparent)]
    Topics(#[from] TopicsError),

    /// Two records supplied the same id
    #[error("Duplicate record id: {0}")]
    DuplicateId(RecordId),

    /// A record id could not be synthesized
    #[error("Invalid record at position {position}: {reason}")]
    InvalidRecord { position: usize, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    /// Check whether this is an embedding dimension mismatch.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, GraphError::Topics(TopicsError::DimensionMismatch { .. }))
    }
}
