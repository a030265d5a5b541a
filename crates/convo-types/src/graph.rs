//! Node-link graph output.
//!
//! The serialized shape is consumed by a force-directed renderer that reads
//! `nodes` and `links` and the per-item field names below. Renaming any of
//! them is a breaking change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// A conversation node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Record id
    pub id: RecordId,
    /// Display title
    pub title: String,
    /// Cluster index
    pub group: usize,
    /// Topic label of the cluster
    pub cluster_label: String,
    /// Preview text
    pub snippet: String,
    /// Number of messages in the conversation
    pub message_count: u32,
    /// `YYYY-MM-DD` in UTC, or `Unknown`
    pub date: String,
}

/// An undirected similarity edge.
///
/// `weight` and `value` always carry the same cosine similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// First endpoint
    pub source: RecordId,
    /// Second endpoint
    pub target: RecordId,
    /// Cosine similarity
    pub weight: f32,
    /// Same as `weight`
    pub value: f32,
}

impl GraphEdge {
    /// Create an edge carrying `similarity` in both weight fields.
    pub fn new(source: RecordId, target: RecordId, similarity: f32) -> Self {
        Self {
            source,
            target,
            weight: similarity,
            value: similarity,
        }
    }

    /// Check whether the edge touches `id`.
    pub fn touches(&self, id: &RecordId) -> bool {
        &self.source == id || &self.target == id
    }
}

/// Node-link similarity graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    /// Always false; edges are undirected
    #[serde(default)]
    pub directed: bool,
    /// Always false; at most one edge per node pair
    #[serde(default)]
    pub multigraph: bool,
    /// Nodes in input order
    pub nodes: Vec<GraphNode>,
    /// Edges ordered by endpoint position
    #[serde(rename = "links", alias = "edges")]
    pub edges: Vec<GraphEdge>,
}

impl Default for NodeLinkGraph {
    fn default() -> Self {
        Self::empty()
    }
}

/// Summary counts for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub clusters: usize,
    pub isolated_nodes: usize,
}

impl NodeLinkGraph {
    /// Graph with no nodes and no edges.
    pub fn empty() -> Self {
        Self {
            directed: false,
            multigraph: false,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Assemble a graph from nodes and edges.
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self {
            directed: false,
            multigraph: false,
            nodes,
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &RecordId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Find the edge between two nodes, in either direction.
    pub fn edge_between(&self, a: &RecordId, b: &RecordId) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| {
            (&e.source == a && &e.target == b) || (&e.source == b && &e.target == a)
        })
    }

    /// Ids adjacent to `id`, sorted.
    pub fn neighbors(&self, id: &RecordId) -> Vec<&RecordId> {
        let neighbors: BTreeSet<&RecordId> = self
            .edges
            .iter()
            .filter_map(|e| {
                if &e.source == id {
                    Some(&e.target)
                } else if &e.target == id {
                    Some(&e.source)
                } else {
                    None
                }
            })
            .collect();
        neighbors.into_iter().collect()
    }

    /// Number of incident edges.
    pub fn degree(&self, id: &RecordId) -> usize {
        self.edges.iter().filter(|e| e.touches(id)).count()
    }

    pub fn stats(&self) -> GraphStats {
        let clusters: BTreeSet<usize> = self.nodes.iter().map(|n| n.group).collect();
        let isolated_nodes = self
            .nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.touches(&n.id)))
            .count();

        GraphStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            clusters: clusters.len(),
            isolated_nodes,
        }
    }
}
