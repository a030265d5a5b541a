//! CLI argument parsing for `convo-graph`.
//!
//! Flags override every other configuration source.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use convo_embeddings::EmbedderKind;
use convo_graph::NeighborStrategy;

/// Conversation similarity graph builder
///
/// Clusters a chat export by topic and links similar conversations.
#[derive(Parser, Debug)]
#[command(name = "convo-graph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default user config file)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a node-link graph from a conversation export
    Build(BuildArgs),

    /// Print statistics for a graph file
    Inspect {
        /// Graph JSON written by `build`
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Conversation export (conversations.json)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the graph JSON
    #[arg(short, long, default_value = "graph.json")]
    pub output: PathBuf,

    /// Minimum cosine similarity for an edge
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Maximum neighbors selected per conversation
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Embedding backend (candle, hashing)
    #[arg(short, long, value_parser = parse_embedder)]
    pub embedder: Option<EmbedderKind>,

    /// Neighbor search strategy (exact, blocked)
    #[arg(short, long, value_parser = parse_strategy)]
    pub strategy: Option<NeighborStrategy>,

    /// Texts per embedding call
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Upper bound on topic clusters
    #[arg(long)]
    pub max_clusters: Option<usize>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

fn parse_embedder(s: &str) -> Result<EmbedderKind, String> {
    s.parse().map_err(|e: convo_embeddings::EmbeddingError| e.to_string())
}

fn parse_strategy(s: &str) -> Result<NeighborStrategy, String> {
    s.parse().map_err(|e: convo_graph::GraphError| e.to_string())
}
