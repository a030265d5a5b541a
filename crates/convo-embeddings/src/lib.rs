//! # convo-embeddings
//!
//! Local embedding generation for conversation records.
//!
//! ## Features
//! - Candle BERT sentence model (all-MiniLM-L6-v2, 384 dimensions)
//! - Automatic model file caching from the HuggingFace Hub
//! - murmur3 feature-hashing embedder for offline use and tests
//! - Batched embedding of [`convo_types::Record`]s

pub mod cache;
pub mod candle;
pub mod config;
pub mod error;
pub mod hashing;
pub mod model;
pub mod records;

pub use crate::candle::{CandleEmbedder, MAX_SEQ_LENGTH};
pub use cache::{get_or_download_model, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use config::{create_embedder, EmbedderKind, EmbeddingConfig};
pub use error::EmbeddingError;
pub use hashing::{HashingEmbedder, DEFAULT_HASHING_DIM};
pub use model::{Embedding, EmbeddingModel, ModelInfo};
pub use records::{embed_records, DEFAULT_BATCH_SIZE};
