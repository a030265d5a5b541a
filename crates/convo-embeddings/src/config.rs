//! Embedding backend selection.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{default_cache_dir, ModelCache, DEFAULT_MODEL_REPO};
use crate::candle::CandleEmbedder;
use crate::error::EmbeddingError;
use crate::hashing::{HashingEmbedder, DEFAULT_HASHING_DIM};
use crate::model::EmbeddingModel;
use crate::records::DEFAULT_BATCH_SIZE;

/// Which embedding backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    /// BERT sentence model via Candle
    #[default]
    Candle,
    /// murmur3 feature hashing, no model files
    Hashing,
}

impl fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedderKind::Candle => write!(f, "candle"),
            EmbedderKind::Hashing => write!(f, "hashing"),
        }
    }
}

impl FromStr for EmbedderKind {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "candle" => Ok(EmbedderKind::Candle),
            "hashing" => Ok(EmbedderKind::Hashing),
            other => Err(EmbeddingError::InvalidInput(format!(
                "unknown embedder '{}', expected 'candle' or 'hashing'",
                other
            ))),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub embedder: EmbedderKind,

    /// HuggingFace repository for the Candle backend
    #[serde(default = "default_model_repo")]
    pub model_repo: String,

    /// Model cache directory; the user cache dir when unset
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Texts per model call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Bucket count for the hashing backend
    #[serde(default = "default_hashing_dimension")]
    pub hashing_dimension: usize,
}

fn default_model_repo() -> String {
    DEFAULT_MODEL_REPO.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_hashing_dimension() -> usize {
    DEFAULT_HASHING_DIM
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::default(),
            model_repo: default_model_repo(),
            cache_dir: None,
            batch_size: default_batch_size(),
            hashing_dimension: default_hashing_dimension(),
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }
        if self.hashing_dimension == 0 {
            return Err("hashing_dimension must be > 0".to_string());
        }
        if self.model_repo.trim().is_empty() {
            return Err("model_repo must not be empty".to_string());
        }
        Ok(())
    }

    pub fn model_cache(&self) -> ModelCache {
        ModelCache::new(
            self.cache_dir.clone().unwrap_or_else(default_cache_dir),
            self.model_repo.clone(),
        )
    }
}

/// Construct the configured embedding backend.
///
/// The Candle backend may download model files on first use.
pub fn create_embedder(
    config: &EmbeddingConfig,
) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
    config.validate().map_err(EmbeddingError::InvalidInput)?;
    info!(embedder = %config.embedder, "Creating embedder");
    match config.embedder {
        EmbedderKind::Candle => Ok(Box::new(CandleEmbedder::load(&config.model_cache())?)),
        EmbedderKind::Hashing => Ok(Box::new(HashingEmbedder::new(config.hashing_dimension)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.embedder, EmbedderKind::Candle);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.hashing_dimension, 384);
        assert!(config.validate().is_ok());
        assert!(config
            .model_cache()
            .cache_dir
            .to_string_lossy()
            .contains("convo-graph"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EmbeddingConfig =
            serde_json::from_str(r#"{"embedder": "hashing", "batch_size": 8}"#).unwrap();
        assert_eq!(config.embedder, EmbedderKind::Hashing);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.model_repo, DEFAULT_MODEL_REPO);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Hashing".parse::<EmbedderKind>().unwrap(), EmbedderKind::Hashing);
        assert_eq!(EmbedderKind::Candle.to_string(), "candle");
        assert!("openai".parse::<EmbedderKind>().is_err());
    }

    #[test]
    fn test_create_hashing_embedder() {
        let config = EmbeddingConfig {
            embedder: EmbedderKind::Hashing,
            hashing_dimension: 16,
            ..Default::default()
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.info().dimension, 16);
    }

    #[test]
    fn test_invalid_config() {
        let config = EmbeddingConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            create_embedder(&config),
            Err(EmbeddingError::InvalidInput(_))
        ));
    }
}
