//! # convo-graph
//!
//! Similarity graph construction over embedded conversations.
//!
//! Records become nodes annotated with their topic cluster; pairs of
//! records whose embeddings are close become weighted undirected edges.
//!
//! ## Pipeline
//! 1. Resolve ids (synthesize missing ones, reject duplicates)
//! 2. Keep records with a non-empty embedding
//! 3. Cluster with seeded k-means and label clusters from term counts
//! 4. Select up to `top_k` neighbors per node above `threshold`
//! 5. Emit a node-link graph
//!
//! ## Usage
//!
//! ```rust
//! use convo_graph::{GraphConfig, SimilarityGraphBuilder};
//! use convo_types::{Record, RecordId};
//!
//! let records = vec![
//!     Record::new(Some(RecordId::from("a")), "A", "rust").with_embedding(vec![1.0, 0.0]),
//!     Record::new(Some(RecordId::from("b")), "B", "rust").with_embedding(vec![1.0, 0.0]),
//! ];
//! let graph = SimilarityGraphBuilder::new(GraphConfig::default()).build(&records).unwrap();
//! assert_eq!(graph.edge_count(), 1);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod ids;
pub mod neighbors;

pub use builder::{format_date, SimilarityGraphBuilder, SINGLE_CONVERSATION_LABEL, UNKNOWN_DATE};
pub use config::{GraphConfig, NeighborStrategy};
pub use error::GraphError;
pub use ids::resolve_ids;
pub use neighbors::{BlockedSearch, ExactSearch, Neighbor, NeighborSearch};
