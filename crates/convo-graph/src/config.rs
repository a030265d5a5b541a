//! Graph builder configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use convo_topics::{ClusteringConfig, LabelingConfig};

use crate::error::GraphError;

/// Neighbor search strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborStrategy {
    /// Materialize the full similarity matrix
    #[default]
    Exact,
    /// Scan in row blocks with a bounded heap per node
    Blocked,
}

impl fmt::Display for NeighborStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborStrategy::Exact => f.write_str("exact"),
            NeighborStrategy::Blocked => f.write_str("blocked"),
        }
    }
}

impl FromStr for NeighborStrategy {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(NeighborStrategy::Exact),
            "blocked" => Ok(NeighborStrategy::Blocked),
            other => Err(GraphError::InvalidConfig(format!(
                "unknown neighbor strategy '{}' (expected exact or blocked)",
                other
            ))),
        }
    }
}

/// Configuration for [`SimilarityGraphBuilder`](crate::SimilarityGraphBuilder).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Minimum cosine similarity for an edge
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Maximum neighbors selected from each node's candidate search
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Neighbor search strategy
    #[serde(default)]
    pub strategy: NeighborStrategy,

    /// Rows per block for the blocked strategy
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// K-means settings (including the cluster cap)
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Keyword labeling settings
    #[serde(default)]
    pub labeling: LabelingConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            top_k: default_top_k(),
            strategy: NeighborStrategy::default(),
            block_size: default_block_size(),
            clustering: ClusteringConfig::default(),
            labeling: LabelingConfig::default(),
        }
    }
}

fn default_threshold() -> f32 {
    0.3
}
fn default_top_k() -> usize {
    5
}
fn default_block_size() -> usize {
    256
}

impl GraphConfig {
    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the per-node neighbor cap.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the neighbor search strategy.
    pub fn with_strategy(mut self, strategy: NeighborStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Validate configuration values.
    ///
    /// Any non-NaN threshold is accepted; one above 1.0 selects no edges.
    /// A `top_k` of zero is also valid and selects no edges.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.threshold.is_nan() {
            return Err(GraphError::InvalidConfig(
                "threshold must be a number, got NaN".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(GraphError::InvalidConfig(
                "block_size must be > 0".to_string(),
            ));
        }
        self.clustering.validate()?;
        self.labeling.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert!((config.threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.strategy, NeighborStrategy::Exact);
        assert_eq!(config.clustering.max_clusters, 8);
        assert_eq!(config.labeling.top_keywords, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(GraphConfig::default().with_top_k(0).validate().is_ok());
        assert!(GraphConfig::default().with_threshold(1.5).validate().is_ok());
        assert!(GraphConfig::default().with_threshold(-2.0).validate().is_ok());
        assert!(GraphConfig::default()
            .with_threshold(f32::NAN)
            .validate()
            .is_err());

        let mut config = GraphConfig::default();
        config.block_size = 0;
        assert!(matches!(config.validate(), Err(GraphError::InvalidConfig(_))));

        let mut config = GraphConfig::default();
        config.clustering.n_init = 0;
        assert!(matches!(config.validate(), Err(GraphError::Topics(_))));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("exact".parse::<NeighborStrategy>().unwrap(), NeighborStrategy::Exact);
        assert_eq!(
            "Blocked".parse::<NeighborStrategy>().unwrap(),
            NeighborStrategy::Blocked
        );
        assert!("approximate".parse::<NeighborStrategy>().is_err());
        assert_eq!(NeighborStrategy::Blocked.to_string(), "blocked");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: GraphConfig =
            serde_json::from_str(r#"{"top_k": 3, "strategy": "blocked"}"#).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.strategy, NeighborStrategy::Blocked);
        assert!((config.threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.clustering.n_init, 10);
    }
}
