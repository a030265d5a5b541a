//! Embedding model trait and types.

use crate::error::EmbeddingError;

/// Vector embedding, normalized to unit length unless all zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding, normalizing the vector to unit length.
    pub fn new(mut values: Vec<f32>) -> Self {
        convo_topics::similarity::normalize(&mut values);
        Self { values }
    }

    /// The zero vector, used for text with no usable content.
    pub fn zeros(dimension: usize) -> Self {
        Self {
            values: vec![0.0; dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// Model information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub name: String,
    pub dimension: usize,
    /// Maximum sequence length in tokens; 0 when unbounded
    pub max_sequence_length: usize,
}

/// Trait for embedding models.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use.
pub trait EmbeddingModel: Send + Sync {
    fn info(&self) -> &ModelInfo;

    /// Generate embedding for a single text.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Generate embeddings for multiple texts, in input order.
    ///
    /// Default implementation calls `embed()` for each text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Generate embeddings for multiple owned strings.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        self.embed_batch(&refs)
    }
}

impl<M: EmbeddingModel + ?Sized> EmbeddingModel for Box<M> {
    fn info(&self) -> &ModelInfo {
        (**self).info()
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        (**self).embed_batch(texts)
    }
}
