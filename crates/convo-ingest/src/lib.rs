//! # convo-ingest
//!
//! Reads a ChatGPT-style `conversations.json` export and normalizes it into
//! [`Record`]s ready for embedding.
//!
//! ```
//! use convo_ingest::{normalize, parse_export};
//!
//! let json = r#"[{"conversation_id": "c1", "title": "Hi", "mapping": {
//!     "n1": {"message": {"author": {"role": "user"},
//!            "content": {"content_type": "text", "parts": ["Hello"]}}}
//! }}]"#;
//! let records = normalize(&parse_export(json).unwrap());
//! assert_eq!(records[0].text, "User: Hello");
//! ```

pub mod error;
pub mod export;
pub mod normalize;

use std::path::Path;

use serde_json::Value;
use tracing::{info, instrument};

use convo_types::Record;

pub use error::IngestError;
pub use export::{Author, Content, Conversation, MappingNode, Message, Role};
pub use normalize::{extract_details, normalize, truncate_snippet, ConversationDetails, UNTITLED};

/// Parse export JSON text.
///
/// The top level must be an array of conversation objects.
pub fn parse_export(json: &str) -> Result<Vec<Conversation>, IngestError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(IngestError::InvalidFormat(format!(
            "expected a JSON array of conversations, found {}",
            json_kind(&value)
        )));
    }
    Ok(serde_json::from_value(value)?)
}

/// Read and parse an export file.
#[instrument(fields(path = %path.as_ref().display()), skip(path))]
pub fn load_export(path: impl AsRef<Path>) -> Result<Vec<Conversation>, IngestError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let conversations = parse_export(&json)?;
    info!(conversations = conversations.len(), "Loaded export");
    Ok(conversations)
}

/// Read an export file and normalize it into records.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>, IngestError> {
    Ok(normalize(&load_export(path)?))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
