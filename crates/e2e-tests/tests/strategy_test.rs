//! Exact and blocked neighbor search must produce the same graph.

use pretty_assertions::assert_eq;

use convo_graph::{GraphConfig, NeighborStrategy, SimilarityGraphBuilder};
use e2e_tests::clustered_records;

fn build(records: &[convo_types::Record], config: GraphConfig) -> convo_types::NodeLinkGraph {
    SimilarityGraphBuilder::new(config).build(records).unwrap()
}

#[test]
fn test_blocked_matches_exact_across_block_sizes() {
    let records = clustered_records(120, 16, 4, 7);
    let exact = build(&records, GraphConfig::default());

    for block_size in [1, 7, 64, 500] {
        let mut config = GraphConfig::default().with_strategy(NeighborStrategy::Blocked);
        config.block_size = block_size;
        let blocked = build(&records, config);
        assert_eq!(exact, blocked, "block_size {}", block_size);
    }
}

#[test]
fn test_blocked_matches_exact_for_threshold_and_top_k() {
    let records = clustered_records(80, 8, 3, 11);
    for (threshold, top_k) in [(0.0, 1), (0.3, 5), (0.8, 10), (-1.0, 3)] {
        let config = GraphConfig::default()
            .with_threshold(threshold)
            .with_top_k(top_k);
        let exact = build(&records, config.clone());
        let blocked = build(&records, config.with_strategy(NeighborStrategy::Blocked));
        assert_eq!(exact, blocked, "threshold {} top_k {}", threshold, top_k);
    }
}

#[test]
fn test_edge_invariants_on_clustered_data() {
    let records = clustered_records(150, 12, 5, 3);
    let config = GraphConfig::default().with_top_k(4);
    let graph = build(&records, config);

    assert_eq!(graph.node_count(), 150);
    // k = min(8, 150 / 5)
    assert!(graph.nodes.iter().all(|n| n.group < 8));
    assert!(graph.edge_count() <= 150 * 4);

    let mut seen = std::collections::BTreeSet::new();
    for edge in &graph.edges {
        assert_ne!(edge.source, edge.target);
        assert!(edge.weight >= 0.3);
        assert!(edge.weight <= 1.0);
        let key = if edge.source < edge.target {
            (edge.source.clone(), edge.target.clone())
        } else {
            (edge.target.clone(), edge.source.clone())
        };
        assert!(seen.insert(key), "duplicate edge {} - {}", edge.source, edge.target);
    }
}
