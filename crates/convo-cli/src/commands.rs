//! Command implementations.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use convo_embeddings::{create_embedder, embed_records};
use convo_graph::SimilarityGraphBuilder;
use convo_ingest::{load_export, normalize};
use convo_types::NodeLinkGraph;

use crate::cli::BuildArgs;
use crate::settings::Settings;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Apply `build` flags on top of loaded settings.
pub fn apply_overrides(settings: &mut Settings, args: &BuildArgs) {
    if let Some(threshold) = args.threshold {
        settings.graph.threshold = threshold;
    }
    if let Some(top_k) = args.top_k {
        settings.graph.top_k = top_k;
    }
    if let Some(strategy) = args.strategy {
        settings.graph.strategy = strategy;
    }
    if let Some(max_clusters) = args.max_clusters {
        settings.graph.clustering.max_clusters = max_clusters;
    }
    if let Some(embedder) = args.embedder {
        settings.embedding.embedder = embedder;
    }
    if let Some(batch_size) = args.batch_size {
        settings.embedding.batch_size = batch_size;
    }
}

/// Counts reported after a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub conversations: usize,
    pub records: usize,
    pub embedded: usize,
    pub nodes: usize,
    pub edges: usize,
    pub clusters: usize,
}

/// Run the whole pipeline synchronously: load, normalize, embed, build.
pub fn build_graph(settings: &Settings, input: &Path) -> Result<(NodeLinkGraph, BuildSummary)> {
    let conversations = load_export(input)
        .with_context(|| format!("Failed to load export {}", input.display()))?;
    let mut records = normalize(&conversations);
    info!(
        conversations = conversations.len(),
        records = records.len(),
        "Loaded conversations"
    );

    let embedder = create_embedder(&settings.embedding).context("Failed to create embedder")?;
    let embedded = embed_records(embedder.as_ref(), &mut records, settings.embedding.batch_size)
        .context("Failed to embed conversations")?;

    let graph = SimilarityGraphBuilder::new(settings.graph.clone())
        .build(&records)
        .context("Failed to build similarity graph")?;

    let stats = graph.stats();
    let summary = BuildSummary {
        conversations: conversations.len(),
        records: records.len(),
        embedded,
        nodes: stats.nodes,
        edges: stats.edges,
        clusters: stats.clusters,
    };
    Ok((graph, summary))
}

/// Serialize a graph to `path`, creating parent directories.
pub fn write_graph(graph: &NodeLinkGraph, path: &Path, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file =
        fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, graph)?;
    } else {
        serde_json::to_writer(&mut writer, graph)?;
    }
    writer.flush()?;
    Ok(())
}

/// Build a graph file from an export.
pub async fn run_build(settings: Settings, args: BuildArgs) -> Result<BuildSummary> {
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        threshold = settings.graph.threshold,
        top_k = settings.graph.top_k,
        strategy = %settings.graph.strategy,
        embedder = %settings.embedding.embedder,
        "Building graph"
    );

    // Model inference and clustering are CPU-bound
    let input = args.input.clone();
    let (graph, summary) = tokio::task::spawn_blocking(move || build_graph(&settings, &input))
        .await
        .context("Build task failed")??;

    write_graph(&graph, &args.output, !args.compact)?;
    info!(path = %args.output.display(), "Graph written");
    Ok(summary)
}

/// Load a graph file and render a human-readable report.
pub fn inspect_graph(path: &Path) -> Result<String> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let graph: NodeLinkGraph = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a node-link graph", path.display()))?;
    Ok(render_report(&graph))
}

fn render_report(graph: &NodeLinkGraph) -> String {
    let stats = graph.stats();
    let mut clusters: BTreeMap<usize, (&str, usize)> = BTreeMap::new();
    for node in &graph.nodes {
        clusters
            .entry(node.group)
            .or_insert((node.cluster_label.as_str(), 0))
            .1 += 1;
    }

    let mut out = String::new();
    out.push_str(&format!("Nodes:    {}\n", stats.nodes));
    out.push_str(&format!("Edges:    {}\n", stats.edges));
    out.push_str(&format!("Clusters: {}\n", stats.clusters));
    out.push_str(&format!("Isolated: {}\n", stats.isolated_nodes));
    if !graph.edges.is_empty() {
        let mean = graph.edges.iter().map(|e| e.weight as f64).sum::<f64>() / graph.edges.len() as f64;
        out.push_str(&format!("Mean edge weight: {:.3}\n", mean));
    }
    for (group, (label, size)) in clusters {
        out.push_str(&format!("  [{}] {} ({})\n", group, label, size));
    }
    out
}

pub fn print_summary(summary: &BuildSummary, output: &Path) {
    println!(
        "Graph has {} nodes and {} edges in {} clusters ({} of {} conversations embedded)",
        summary.nodes, summary.edges, summary.clusters, summary.embedded, summary.conversations
    );
    println!("Wrote {}", output.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use convo_embeddings::EmbedderKind;
    use convo_graph::NeighborStrategy;
    use convo_types::{GraphEdge, GraphNode, RecordId};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn args() -> BuildArgs {
        BuildArgs {
            input: PathBuf::from("in.json"),
            output: PathBuf::from("out.json"),
            threshold: None,
            top_k: None,
            embedder: None,
            strategy: None,
            batch_size: None,
            max_clusters: None,
            compact: false,
        }
    }

    fn node(id: &str, group: usize, label: &str) -> GraphNode {
        GraphNode {
            id: RecordId::from(id),
            title: id.to_string(),
            group,
            cluster_label: label.to_string(),
            snippet: String::new(),
            message_count: 1,
            date: "Unknown".to_string(),
        }
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &args());
        assert_eq!(settings.graph.top_k, 5);

        let overrides = BuildArgs {
            threshold: Some(0.6),
            top_k: Some(2),
            embedder: Some(EmbedderKind::Hashing),
            strategy: Some(NeighborStrategy::Blocked),
            batch_size: Some(4),
            max_clusters: Some(3),
            ..args()
        };
        apply_overrides(&mut settings, &overrides);
        assert!((settings.graph.threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(settings.graph.top_k, 2);
        assert_eq!(settings.graph.strategy, NeighborStrategy::Blocked);
        assert_eq!(settings.graph.clustering.max_clusters, 3);
        assert_eq!(settings.embedding.embedder, EmbedderKind::Hashing);
        assert_eq!(settings.embedding.batch_size, 4);
    }

    #[test]
    fn test_render_report() {
        let graph = NodeLinkGraph::new(
            vec![node("a", 0, "Travel"), node("b", 0, "Travel"), node("c", 1, "Rust")],
            vec![GraphEdge::new(RecordId::from("a"), RecordId::from("b"), 0.5)],
        );
        let report = render_report(&graph);
        assert_eq!(
            report,
            "Nodes:    3\nEdges:    1\nClusters: 2\nIsolated: 1\nMean edge weight: 0.500\n  [0] Travel (2)\n  [1] Rust (1)\n"
        );
    }

    #[test]
    fn test_write_and_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("graph.json");
        let graph = NodeLinkGraph::new(vec![node("only", 0, "Single Conversation")], vec![]);

        write_graph(&graph, &path, false).unwrap();
        let report = inspect_graph(&path).unwrap();
        assert!(report.starts_with("Nodes:    1\nEdges:    0\n"));
        assert!(report.contains("Single Conversation (1)"));
    }

    #[test]
    fn test_inspect_rejects_non_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(inspect_graph(&path).is_err());
    }
}
