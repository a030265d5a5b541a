use std::time::Instant;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use convo_graph::{GraphConfig, NeighborStrategy, SimilarityGraphBuilder};
use e2e_tests::clustered_records;

const DEFAULT_ITERATIONS: usize = 3;
const DIMENSION: usize = 384;

#[derive(Parser, Debug)]
#[command(name = "perf_bench", about = "Graph builder benchmark on synthetic embeddings")]
struct Args {
    #[arg(long, value_enum, default_value = "small")]
    tier: DatasetTier,
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,
    #[arg(long, default_value_t = 256)]
    block_size: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum DatasetTier {
    Small,
    Medium,
    Large,
}

impl DatasetTier {
    fn record_count(self) -> usize {
        match self {
            DatasetTier::Small => 200,
            DatasetTier::Medium => 2_000,
            DatasetTier::Large => 8_000,
        }
    }
}

#[derive(Debug, Serialize)]
struct StrategyResult {
    strategy: String,
    min_ms: f64,
    mean_ms: f64,
    max_ms: f64,
    edges: usize,
}

#[derive(Debug, Serialize)]
struct Report {
    tier: DatasetTier,
    records: usize,
    dimension: usize,
    iterations: usize,
    results: Vec<StrategyResult>,
}

fn run_strategy(
    records: &[convo_types::Record],
    config: &GraphConfig,
    iterations: usize,
) -> Result<StrategyResult, convo_graph::GraphError> {
    let builder = SimilarityGraphBuilder::new(config.clone());
    let mut timings = Vec::with_capacity(iterations);
    let mut edges = 0;
    for _ in 0..iterations {
        let start = Instant::now();
        let graph = builder.build(records)?;
        timings.push(start.elapsed().as_secs_f64() * 1000.0);
        edges = graph.edge_count();
    }

    let min_ms = timings.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_ms = timings.iter().cloned().fold(0.0, f64::max);
    let mean_ms = timings.iter().sum::<f64>() / timings.len().max(1) as f64;
    Ok(StrategyResult {
        strategy: config.strategy.to_string(),
        min_ms,
        mean_ms,
        max_ms,
        edges,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let iterations = args.iterations.max(1);
    let n = args.tier.record_count();

    eprintln!("Generating {} records ({} dims)", n, DIMENSION);
    let records = clustered_records(n, DIMENSION, 8, args.seed);

    let exact = GraphConfig::default();
    let mut blocked = GraphConfig::default().with_strategy(NeighborStrategy::Blocked);
    blocked.block_size = args.block_size;

    let mut results = Vec::new();
    for config in [&exact, &blocked] {
        eprintln!("Running {} x{}", config.strategy, iterations);
        results.push(run_strategy(&records, config, iterations)?);
    }

    let report = Report {
        tier: args.tier,
        records: n,
        dimension: DIMENSION,
        iterations,
        results,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
