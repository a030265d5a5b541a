//! Candle-based sentence embedder.
//!
//! Runs a BERT sentence-transformer on CPU: tokenize, forward pass, mean
//! pooling over real tokens, then L2 normalization. The default model,
//! all-MiniLM-L6-v2, produces 384-dimensional vectors.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::cache::{get_or_download_model, ModelCache};
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Maximum sequence length; longer transcripts are truncated
pub const MAX_SEQ_LENGTH: usize = 256;

#[derive(Deserialize)]
struct HiddenSize {
    hidden_size: usize,
}

pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load the model from cache, downloading it first if needed.
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache)?;
        Self::load_from_paths(
            cache.model_name(),
            &paths.config,
            &paths.tokenizer,
            &paths.weights,
        )
    }

    pub fn load_default() -> Result<Self, EmbeddingError> {
        Self::load(&ModelCache::default())
    }

    pub fn load_from_paths(
        name: &str,
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> Result<Self, EmbeddingError> {
        info!(model = name, "Loading embedding model");

        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;
        let dimension = serde_json::from_str::<HiddenSize>(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?
            .hidden_size;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        // SAFETY: the weights file is not modified while mapped
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };
        let model = BertModel::load(vb, &config)?;

        info!(dim = dimension, max_seq = MAX_SEQ_LENGTH, "Model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: name.to_string(),
                dimension,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }

    /// Mean pooling over token embeddings, excluding padding.
    fn mean_pooling(
        &self,
        embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, EmbeddingError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(embeddings.shape())?
            .to_dtype(DType::F32)?;

        let sum = embeddings.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum.broadcast_div(&counts)?)
    }

    /// Tokenize, truncate and right-pad a batch to a common length.
    fn encode(&self, texts: &[&str]) -> Result<(Tensor, Tensor), EmbeddingError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_SEQ_LENGTH);

        let mut ids_flat = Vec::with_capacity(texts.len() * max_len);
        let mut mask_flat = Vec::with_capacity(texts.len() * max_len);
        for encoding in &encodings {
            let len = encoding.get_ids().len().min(max_len);
            ids_flat.extend_from_slice(&encoding.get_ids()[..len]);
            mask_flat.extend_from_slice(&encoding.get_attention_mask()[..len]);
            ids_flat.extend(std::iter::repeat(0u32).take(max_len - len));
            mask_flat.extend(std::iter::repeat(0u32).take(max_len - len));
        }

        let shape = (texts.len(), max_len);
        let input_ids = Tensor::from_vec(ids_flat, shape, &self.device)?;
        let attention_mask = Tensor::from_vec(mask_flat, shape, &self.device)?;
        Ok((input_ids, attention_mask))
    }
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0,
            })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        debug!(count = texts.len(), "Embedding batch");

        let (input_ids, attention_mask) = self.encode(texts)?;
        let token_type_ids = input_ids.zeros_like()?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled: Vec<Vec<f32>> = self.mean_pooling(&output, &attention_mask)?.to_vec2()?;

        let embeddings: Vec<Embedding> = pooled.into_iter().map(Embedding::new).collect();
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        Ok(embeddings)
    }
}
