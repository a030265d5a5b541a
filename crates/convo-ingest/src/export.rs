//! Serde model of a ChatGPT-style conversation export.
//!
//! The export is a JSON array of conversations. Each conversation stores its
//! messages in a `mapping` object keyed by node id; nodes without a message
//! (the synthetic root, for one) are carried but ignored downstream.
//!
//! Only the fields needed to build records are modeled. Unknown fields are
//! ignored, and malformed optional values fall back to their defaults rather
//! than failing the whole export.

use std::collections::BTreeMap;

use convo_types::RecordId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One conversation from the export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub conversation_id: Option<RecordId>,

    #[serde(default)]
    pub id: Option<RecordId>,

    #[serde(default)]
    pub title: Option<String>,

    /// Seconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient")]
    pub create_time: Option<f64>,

    /// Message tree, keyed by node id.
    #[serde(default)]
    pub mapping: BTreeMap<String, MappingNode>,
}

impl Conversation {
    /// Identifier for the conversation.
    ///
    /// `conversation_id` wins over `id` unless it is empty or zero. An empty
    /// `id` counts as absent.
    pub fn record_id(&self) -> Option<RecordId> {
        self.conversation_id
            .as_ref()
            .filter(|id| !is_falsy(id))
            .or_else(|| {
                self.id
                    .as_ref()
                    .filter(|id| !matches!(id, RecordId::Text(s) if s.is_empty()))
            })
            .cloned()
    }

    /// Messages in the mapping, in chronological order.
    ///
    /// Messages without a timestamp sort as time zero. Ties keep node-id order.
    pub fn messages(&self) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self
            .mapping
            .values()
            .filter_map(|node| node.message.as_ref())
            .collect();
        messages.sort_by(|a, b| a.sort_time().total_cmp(&b.sort_time()));
        messages
    }
}

/// A node in the conversation's message tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingNode {
    #[serde(default)]
    pub message: Option<Message>,

    #[serde(default, deserialize_with = "lenient")]
    pub parent: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub children: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<Author>,

    #[serde(default, deserialize_with = "lenient")]
    pub create_time: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<Content>,
}

impl Message {
    pub fn role(&self) -> Role {
        self.author.as_ref().map(|a| a.role.clone()).unwrap_or_default()
    }

    fn sort_time(&self) -> f64 {
        self.create_time.filter(|t| t.is_finite()).unwrap_or(0.0)
    }

    /// Text of the message, or `None` for non-text or empty content.
    pub fn text(&self) -> Option<String> {
        self.content.as_ref().and_then(Content::text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub role: Role,
}

/// Message author role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    #[default]
    #[serde(other)]
    Other,
}

/// Message content, tagged by `content_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum Content {
    Text {
        #[serde(default)]
        parts: Vec<Value>,
    },
    /// Code, images, browsing results and anything else.
    #[serde(other)]
    Unsupported,
}

impl Content {
    /// Join text parts with a single space.
    ///
    /// Strings are used as-is; other JSON values are rendered as JSON text.
    /// Null, empty, zero and false parts are skipped.
    pub fn text(&self) -> Option<String> {
        match self {
            Content::Text { parts } => {
                let joined = parts
                    .iter()
                    .filter(|p| is_truthy(p))
                    .map(|p| match p {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                (!joined.is_empty()).then_some(joined)
            }
            Content::Unsupported => None,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Deserialize an optional field, mapping shape mismatches to `None`.
fn is_falsy(id: &RecordId) -> bool {
    match id {
        RecordId::Int(n) => *n == 0,
        RecordId::Text(s) => s.is_empty(),
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
