//! Similarity graph assembly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use convo_topics::{check_dimensions, cluster_count, KMeans, KeywordLabeler, TopicLabeler};
use convo_types::{GraphEdge, GraphNode, NodeLinkGraph, Record, RecordId};

use crate::config::{GraphConfig, NeighborStrategy};
use crate::error::GraphError;
use crate::ids::resolve_ids;
use crate::neighbors::{BlockedSearch, ExactSearch, NeighborSearch};

/// Cluster label used when the corpus has a single valid record.
pub const SINGLE_CONVERSATION_LABEL: &str = "Single Conversation";

/// Date shown for records without a usable timestamp.
pub const UNKNOWN_DATE: &str = "Unknown";

/// Builds node-link similarity graphs from embedded records.
///
/// Holds no state between calls: each [`build`](Self::build) is a pure
/// function of the records and the configuration.
pub struct SimilarityGraphBuilder {
    config: GraphConfig,
    labeler: Box<dyn TopicLabeler>,
}

impl SimilarityGraphBuilder {
    /// Create a builder using the keyword labeler.
    pub fn new(config: GraphConfig) -> Self {
        let labeler = KeywordLabeler::new(config.labeling.clone());
        Self {
            config,
            labeler: Box::new(labeler),
        }
    }

    /// Replace the topic labeler.
    pub fn with_labeler(mut self, labeler: impl TopicLabeler + 'static) -> Self {
        self.labeler = Box::new(labeler);
        self
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Build the graph.
    ///
    /// Records with an empty embedding are skipped. Zero valid records give
    /// an empty graph; a single one gives a lone node labeled
    /// [`SINGLE_CONVERSATION_LABEL`].
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for a NaN threshold or other out-of-range settings
    /// - `DuplicateId` when two valid records supply the same id
    /// - `Topics(DimensionMismatch)` when embeddings differ in length
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build(&self, records: &[Record]) -> Result<NodeLinkGraph, GraphError> {
        self.config.validate()?;

        let valid: Vec<(usize, &Record)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_valid())
            .collect();
        if valid.len() < records.len() {
            debug!(
                skipped = records.len() - valid.len(),
                "Skipping records without embeddings"
            );
        }

        let ids = resolve_ids(&valid)?;

        match valid.len() {
            0 => {
                info!("No valid records, returning empty graph");
                return Ok(NodeLinkGraph::empty());
            }
            1 => {
                let (_, record) = valid[0];
                let node = make_node(ids[0].clone(), record, 0, SINGLE_CONVERSATION_LABEL);
                return Ok(NodeLinkGraph::new(vec![node], Vec::new()));
            }
            _ => {}
        }

        let embeddings: Vec<&[f32]> = valid.iter().map(|(_, r)| r.embedding.as_slice()).collect();
        let dimension = check_dimensions(&embeddings)?;

        let k = cluster_count(valid.len(), self.config.clustering.max_clusters);
        info!(n = valid.len(), dimension, k, "Clustering records");
        let clustering = KMeans::new(self.config.clustering.clone()).fit(&embeddings, k)?;

        let texts: Vec<&str> = valid.iter().map(|(_, r)| r.text.as_str()).collect();
        let labels = self
            .labeler
            .label_clusters(&texts, &clustering.assignments, k);

        let nodes: Vec<GraphNode> = valid
            .iter()
            .zip(ids.iter())
            .zip(clustering.assignments.iter())
            .map(|(((_, record), id), &group)| {
                let label = labels
                    .get(&group)
                    .map(|l| l.label.clone())
                    .unwrap_or_else(|| format!("Group {}", group));
                make_node(id.clone(), record, group, &label)
            })
            .collect();

        let edges = self.select_edges(&embeddings, &ids)?;
        let graph = NodeLinkGraph::new(nodes, edges);

        let stats = graph.stats();
        info!(
            nodes = stats.nodes,
            edges = stats.edges,
            clusters = stats.clusters,
            isolated = stats.isolated_nodes,
            "Graph built"
        );
        Ok(graph)
    }

    /// Run neighbor search and merge the results into undirected edges.
    ///
    /// A pair selected from both ends is stored once; similarity is
    /// symmetric, so the second insert would carry the same weight.
    fn select_edges(
        &self,
        embeddings: &[&[f32]],
        ids: &[RecordId],
    ) -> Result<Vec<GraphEdge>, GraphError> {
        let search: Box<dyn NeighborSearch> = match self.config.strategy {
            NeighborStrategy::Exact => Box::new(ExactSearch),
            NeighborStrategy::Blocked => Box::new(BlockedSearch::new(self.config.block_size)),
        };
        debug!(strategy = %self.config.strategy, "Selecting neighbors");

        let selected = search.search(embeddings, ids, self.config.threshold, self.config.top_k)?;

        let mut pairs: BTreeMap<(usize, usize), f32> = BTreeMap::new();
        for (i, neighbors) in selected.iter().enumerate() {
            for neighbor in neighbors {
                let key = (i.min(neighbor.index), i.max(neighbor.index));
                pairs.entry(key).or_insert(neighbor.similarity);
            }
        }

        Ok(pairs
            .into_iter()
            .map(|((lo, hi), similarity)| GraphEdge::new(ids[lo].clone(), ids[hi].clone(), similarity))
            .collect())
    }
}

impl Default for SimilarityGraphBuilder {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

fn make_node(id: RecordId, record: &Record, group: usize, label: &str) -> GraphNode {
    GraphNode {
        id,
        title: record.title.clone(),
        group,
        cluster_label: label.to_string(),
        snippet: record.snippet.clone(),
        message_count: record.message_count,
        date: format_date(record.create_time),
    }
}

/// Format an epoch-seconds timestamp as `YYYY-MM-DD` in UTC.
///
/// Missing, non-finite, or out-of-range timestamps give [`UNKNOWN_DATE`].
pub fn format_date(create_time: Option<f64>) -> String {
    create_time
        .filter(|t| t.is_finite())
        .and_then(|t| {
            let secs = t.floor();
            let nanos = ((t - secs) * 1e9) as u32;
            DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999))
        })
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}
