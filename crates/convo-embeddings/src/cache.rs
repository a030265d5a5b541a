//! Model file caching.
//!
//! Model files are fetched from the HuggingFace Hub once and kept in a flat
//! per-repository directory so later runs work offline.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Default model repository on HuggingFace
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Files a BERT sentence model needs
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Where model files live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCache {
    pub cache_dir: PathBuf,
    /// HuggingFace repository id, e.g. `sentence-transformers/all-MiniLM-L6-v2`
    pub repo_id: String,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            repo_id: DEFAULT_MODEL_REPO.to_string(),
        }
    }
}

/// `<user cache dir>/convo-graph/models`, or `.cache/...` when unknown.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("convo-graph")
        .join("models")
}

impl ModelCache {
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Directory holding this repository's files.
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    /// Short model name: the last path segment of the repository id.
    pub fn model_name(&self) -> &str {
        self.repo_id.rsplit('/').next().unwrap_or(&self.repo_id)
    }

    pub fn is_cached(&self) -> bool {
        let model_dir = self.model_dir();
        MODEL_FILES.iter().all(|f| model_dir.join(f).exists())
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }

    /// Paths the model files occupy, whether or not they exist yet.
    pub fn paths(&self) -> ModelPaths {
        ModelPaths {
            config: self.file_path("config.json"),
            tokenizer: self.file_path("tokenizer.json"),
            weights: self.file_path("model.safetensors"),
        }
    }
}

/// Paths to model files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

/// Get or download model files.
pub fn get_or_download_model(cache: &ModelCache) -> Result<ModelPaths, EmbeddingError> {
    if cache.is_cached() {
        debug!(path = ?cache.model_dir(), "Using cached model");
    } else {
        info!(repo = %cache.repo_id, "Downloading model files");
        download_model_files(cache)?;
    }
    Ok(cache.paths())
}

fn download_model_files(cache: &ModelCache) -> Result<(), EmbeddingError> {
    use hf_hub::api::sync::ApiBuilder;

    let api = ApiBuilder::new()
        .with_progress(false)
        .with_cache_dir(cache.cache_dir.join("hub"))
        .build()
        .map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(cache.repo_id.clone());

    std::fs::create_dir_all(cache.model_dir())?;

    for filename in MODEL_FILES {
        debug!(file = filename, "Fetching");
        let source_path = repo
            .get(filename)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", filename, e)))?;

        let dest_path = cache.file_path(filename);
        std::fs::copy(&source_path, &dest_path)?;
        debug!(file = filename, dest = ?dest_path, "Cached");
    }

    Ok(())
}
