//! # convo-topics
//!
//! Topic clustering and labeling for conversation embeddings.
//!
//! Groups conversations by embedding proximity and names each group from the
//! vocabulary of its members.
//!
//! ## Features
//! - Seeded k-means with k-means++ initialization and multiple restarts
//! - Derived cluster count: `max(1, min(cap, n / 5))`
//! - Term-count keyword extraction with a stop-word list and vocabulary cap
//! - Title-cased cluster labels with a `Misc` fallback
//! - Cosine similarity helpers shared with the graph builder

pub mod config;
pub mod error;
pub mod kmeans;
pub mod labeling;
pub mod similarity;
pub mod vectorizer;

pub use config::{ClusteringConfig, LabelingConfig};
pub use error::TopicsError;
pub use kmeans::{cluster_count, KMeans, KMeansResult};
pub use labeling::{KeywordLabeler, TopicLabel, TopicLabeler, MISC_LABEL};
pub use similarity::{check_dimensions, cosine_similarity, similarity_matrix};
pub use vectorizer::CountVectorizer;
