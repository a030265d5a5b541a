//! End-to-end test infrastructure for convo-graph.
//!
//! Provides a temp-dir harness, synthetic export builders and synthetic
//! embedding generators shared by the integration tests and the benchmark.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use convo_cli::Settings;
use convo_embeddings::EmbedderKind;
use convo_types::{Record, RecordId};

/// Epoch seconds for 2023-11-14 UTC.
pub const BASE_TIME: f64 = 1_700_000_000.0;

/// Temp directory holding export and graph files for one test.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub export_path: PathBuf,
    pub graph_path: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let export_path = temp_dir.path().join("conversations.json");
        let graph_path = temp_dir.path().join("out").join("graph.json");
        Self {
            _temp_dir: temp_dir,
            export_path,
            graph_path,
        }
    }

    /// Write `conversations` as the export file.
    pub fn write_export(&self, conversations: &[Value]) {
        let json = serde_json::to_string_pretty(conversations).expect("Failed to serialize export");
        std::fs::write(&self.export_path, json).expect("Failed to write export");
    }

    /// Read the graph file back as raw JSON.
    pub fn read_graph_json(&self) -> Value {
        let json = std::fs::read_to_string(&self.graph_path).expect("Failed to read graph");
        serde_json::from_str(&json).expect("Graph is not valid JSON")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Build one export conversation from `(role, text)` turns.
///
/// Turns get increasing message timestamps; the mapping also carries an
/// empty root node like real exports do.
pub fn conversation(id: &str, title: &str, create_time: f64, turns: &[(&str, &str)]) -> Value {
    let mut mapping = serde_json::Map::new();
    mapping.insert(
        "root".to_string(),
        json!({"message": null, "parent": null, "children": ["m0"]}),
    );
    for (i, (role, text)) in turns.iter().enumerate() {
        let parent = if i == 0 {
            "root".to_string()
        } else {
            format!("m{}", i - 1)
        };
        mapping.insert(
            format!("m{}", i),
            json!({
                "message": {
                    "author": {"role": role},
                    "create_time": create_time + i as f64,
                    "content": {"content_type": "text", "parts": [text]}
                },
                "parent": parent,
                "children": []
            }),
        );
    }
    json!({
        "conversation_id": id,
        "title": title,
        "create_time": create_time,
        "mapping": Value::Object(mapping),
    })
}

/// Five travel and five baking conversations with shared topic vocabulary.
pub fn two_topic_export() -> Vec<Value> {
    let travel = ["friends", "family", "students", "couples", "retirees"];
    let baking = ["beginners", "bakers", "weekends", "winter", "summer"];

    let mut conversations = Vec::new();
    for (i, who) in travel.iter().enumerate() {
        let question = format!("Cheap flights to Lisbon for {}", who);
        let answer = format!("Lisbon flights are cheap; book the trip for {} early", who);
        conversations.push(conversation(
            &format!("travel-{}", i),
            &format!("Lisbon trip for {}", who),
            BASE_TIME + i as f64 * 86_400.0,
            &[("user", question.as_str()), ("assistant", answer.as_str())],
        ));
    }
    for (i, who) in baking.iter().enumerate() {
        let question = format!("Sourdough starter tips for {}", who);
        let answer = format!("Feed the sourdough starter flour and water for {}", who);
        conversations.push(conversation(
            &format!("baking-{}", i),
            &format!("Sourdough for {}", who),
            BASE_TIME + (i + 5) as f64 * 86_400.0,
            &[("user", question.as_str()), ("assistant", answer.as_str())],
        ));
    }
    conversations
}

/// Settings that use the hashing embedder, so no model download is needed.
pub fn hashing_settings() -> Settings {
    let mut settings = Settings::default();
    settings.embedding.embedder = EmbedderKind::Hashing;
    settings
}

/// Records with random unit embeddings scattered around `centers` centers.
pub fn clustered_records(n: usize, dimension: usize, centers: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centroids: Vec<Vec<f32>> = (0..centers.max(1))
        .map(|_| random_unit(&mut rng, dimension))
        .collect();

    (0..n)
        .map(|i| {
            let center = &centroids[i % centroids.len()];
            let noise = random_unit(&mut rng, dimension);
            let embedding: Vec<f32> = center
                .iter()
                .zip(noise.iter())
                .map(|(c, e)| c + 0.6 * e)
                .collect();
            Record::new(
                Some(RecordId::Int(i as i64)),
                format!("Conversation {}", i),
                format!("synthetic text {}", i % centroids.len()),
            )
            .with_embedding(embedding)
        })
        .collect()
}

fn random_unit(rng: &mut StdRng, dimension: usize) -> Vec<f32> {
    let mut v: Vec<f32> = (0..dimension).map(|_| rng.random_range(-1.0f32..1.0)).collect();
    convo_topics::similarity::normalize(&mut v);
    v
}
