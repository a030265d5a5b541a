//! Conversation records entering the graph builder.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a record, as supplied by the export or synthesized.
///
/// Exports carry either string or integer ids; both are kept as-is so the
/// graph output preserves the original JSON type. Ordering puts integers
/// before strings and is used as the similarity tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer id
    Int(i64),
    /// String id
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

/// One conversation under analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Source id; `None` when the export supplied none
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Concatenated conversation text, used for keyword extraction
    #[serde(default)]
    pub text: String,
    /// Short preview shown next to the node
    #[serde(default)]
    pub snippet: String,
    /// Number of non-empty messages
    #[serde(default)]
    pub message_count: u32,
    /// Creation time in epoch seconds
    #[serde(default)]
    pub create_time: Option<f64>,
    /// Embedding vector; empty marks the record invalid
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Record {
    /// Create a record with no snippet, timestamp, or embedding.
    pub fn new(id: Option<RecordId>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    /// Set the snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the message count.
    pub fn with_message_count(mut self, message_count: u32) -> Self {
        self.message_count = message_count;
        self
    }

    /// Set the creation time (epoch seconds).
    pub fn with_create_time(mut self, create_time: f64) -> Self {
        self.create_time = Some(create_time);
        self
    }

    /// A record takes part in the graph only if it has an embedding.
    pub fn is_valid(&self) -> bool {
        !self.embedding.is_empty()
    }

    /// Embedding dimension (0 for invalid records).
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_validity() {
        let record = Record::new(None, "t", "text");
        assert!(!record.is_valid());
        assert_eq!(record.dimension(), 0);

        let record = record.with_embedding(vec![1.0, 0.0]);
        assert!(record.is_valid());
        assert_eq!(record.dimension(), 2);
    }

    #[test]
    fn test_record_id_ordering() {
        let mut ids = vec![
            RecordId::from("b"),
            RecordId::from(7i64),
            RecordId::from("a"),
            RecordId::from(-3i64),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                RecordId::from(-3i64),
                RecordId::from(7i64),
                RecordId::from("a"),
                RecordId::from("b"),
            ]
        );
    }

    #[test]
    fn test_record_id_untagged_serde() {
        let text: RecordId = serde_json::from_str("\"abc-123\"").unwrap();
        assert_eq!(text, RecordId::from("abc-123"));

        let int: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(int, RecordId::Int(42));
        assert_eq!(serde_json::to_string(&int).unwrap(), "42");
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::from("x").to_string(), "x");
        assert_eq!(RecordId::from(5i64).to_string(), "5");
    }

    #[test]
    fn test_record_deserialize_defaults() {
        let record: Record = serde_json::from_str(r#"{"title": "only a title"}"#).unwrap();
        assert!(record.id.is_none());
        assert_eq!(record.title, "only a title");
        assert!(record.create_time.is_none());
        assert!(!record.is_valid());
    }
}
