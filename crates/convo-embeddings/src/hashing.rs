//! Feature-hashing embedder.
//!
//! Maps each token to a signed bucket with murmur3 and L2-normalizes the
//! bucket counts. Needs no model files, so it works offline and in tests.
//! Texts that share vocabulary land close together; there is no notion of
//! synonyms.

use std::collections::HashSet;

use murmur3::murmur3_x86_128;

use convo_topics::vectorizer::tokenize;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Default number of hash buckets, matching the sentence model's width
pub const DEFAULT_HASHING_DIM: usize = 384;

pub struct HashingEmbedder {
    stop_words: HashSet<String>,
    info: ModelInfo,
}

impl HashingEmbedder {
    /// Create an embedder with `dimension` buckets.
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidInput(
                "hashing dimension must be > 0".to_string(),
            ));
        }
        Ok(Self::with_dimension(dimension))
    }

    fn with_dimension(dimension: usize) -> Self {
        Self {
            stop_words: ["user", "assistant"].iter().map(|w| w.to_string()).collect(),
            info: ModelInfo {
                name: format!("murmur3-hashing-{}", dimension),
                dimension,
                max_sequence_length: 0,
            },
        }
    }

    /// Replace the extra stop words dropped before hashing.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Bucket index and sign for a token.
    fn bucket(&self, token: &str) -> Result<(usize, f32), EmbeddingError> {
        let hash = murmur3_x86_128(&mut token.as_bytes(), 0)?;
        let index = (hash as u64 % self.info.dimension as u64) as usize;
        let sign = if (hash >> 64) & 1 == 0 { 1.0 } else { -1.0 };
        Ok((index, sign))
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::with_dimension(DEFAULT_HASHING_DIM)
    }
}

impl EmbeddingModel for HashingEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Text without usable tokens embeds to the zero vector.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut values = vec![0.0f32; self.info.dimension];
        for token in tokenize(text, &self.stop_words) {
            let (index, sign) = self.bucket(&token)?;
            values[index] += sign;
        }
        Ok(Embedding::new(values))
    }
}
