//! # convo-types
//!
//! Shared domain types for the conversation graph workspace.
//!
//! This crate defines the data structures passed between crates:
//! - Records: one conversation with metadata and its embedding
//! - Graph: the node-link similarity graph produced by `convo-graph`
//!
//! ## Usage
//!
//! ```rust
//! use convo_types::{Record, RecordId};
//!
//! let record = Record::new(Some(RecordId::from("c-1")), "Trip planning", "flights and hotels")
//!     .with_embedding(vec![0.1, 0.2, 0.3]);
//! assert!(record.is_valid());
//! ```

pub mod graph;
pub mod record;

pub use graph::{GraphEdge, GraphNode, GraphStats, NodeLinkGraph};
pub use record::{Record, RecordId};
