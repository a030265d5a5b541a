//! Clustering and labeling configuration.

use serde::{Deserialize, Serialize};

use crate::error::TopicsError;

/// K-means settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Upper bound on the derived cluster count
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,

    /// Number of seeded restarts; the lowest-inertia run wins
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    /// Maximum Lloyd iterations per restart
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence tolerance, relative to the mean feature variance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// RNG seed for initialization
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            max_clusters: default_max_clusters(),
            n_init: default_n_init(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: default_seed(),
        }
    }
}

impl ClusteringConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), TopicsError> {
        if self.max_clusters == 0 {
            return Err(TopicsError::InvalidConfig(
                "max_clusters must be > 0".to_string(),
            ));
        }
        if self.n_init == 0 {
            return Err(TopicsError::InvalidConfig("n_init must be > 0".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(TopicsError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(TopicsError::InvalidConfig(format!(
                "tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

fn default_max_clusters() -> usize {
    8
}
fn default_n_init() -> usize {
    10
}
fn default_max_iterations() -> usize {
    300
}
fn default_tolerance() -> f64 {
    1e-4
}
fn default_seed() -> u64 {
    42
}

/// Keyword labeling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Keywords joined into each label
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    /// Vocabulary cap (most frequent terms across the corpus)
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Words ignored in addition to the English stop-word list
    #[serde(default = "default_extra_stop_words")]
    pub extra_stop_words: Vec<String>,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            top_keywords: default_top_keywords(),
            max_features: default_max_features(),
            extra_stop_words: default_extra_stop_words(),
        }
    }
}

impl LabelingConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), TopicsError> {
        if self.top_keywords == 0 {
            return Err(TopicsError::InvalidConfig(
                "top_keywords must be > 0".to_string(),
            ));
        }
        if self.max_features == 0 {
            return Err(TopicsError::InvalidConfig(
                "max_features must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_top_keywords() -> usize {
    3
}
fn default_max_features() -> usize {
    1000
}
// Speaker prefixes added by the export parser
fn default_extra_stop_words() -> Vec<String> {
    vec!["user".to_string(), "assistant".to_string()]
}
