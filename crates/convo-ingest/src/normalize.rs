//! Turn parsed conversations into graph records.

use tracing::{debug, info, instrument};

use convo_types::Record;

use crate::export::{Conversation, Role};

/// Title used when a conversation has none.
pub const UNTITLED: &str = "Untitled";

/// Snippets longer than this many characters are truncated.
pub const SNIPPET_MAX_CHARS: usize = 300;

/// Text, message count and snippet extracted from one conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationDetails {
    pub text: String,
    pub message_count: u32,
    pub snippet: String,
}

/// Flatten a conversation's messages into a transcript.
///
/// Every non-empty text message counts toward `message_count`, but only
/// user and assistant turns appear in the transcript, as `User: ...` and
/// `Assistant: ...` lines.
pub fn extract_details(conversation: &Conversation) -> ConversationDetails {
    let mut lines = Vec::new();
    let mut message_count = 0u32;
    let mut first_user_message: Option<String> = None;

    for message in conversation.messages() {
        let Some(text) = message.text() else {
            continue;
        };
        message_count += 1;

        match message.role() {
            Role::User => {
                lines.push(format!("User: {}", text));
                if first_user_message.is_none() {
                    first_user_message = Some(text);
                }
            }
            Role::Assistant => lines.push(format!("Assistant: {}", text)),
            _ => {}
        }
    }

    ConversationDetails {
        text: lines.join("\n"),
        message_count,
        snippet: first_user_message.map(|m| truncate_snippet(&m)).unwrap_or_default(),
    }
}

/// Truncate to [`SNIPPET_MAX_CHARS`] characters, appending `...` when cut.
pub fn truncate_snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Convert conversations to records, dropping those without any text.
///
/// Records come back without embeddings.
#[instrument(skip_all, fields(conversations = conversations.len()))]
pub fn normalize(conversations: &[Conversation]) -> Vec<Record> {
    let records: Vec<Record> = conversations
        .iter()
        .filter_map(|conversation| {
            let details = extract_details(conversation);
            if details.text.trim().is_empty() {
                debug!(id = ?conversation.record_id(), "Dropping conversation without text");
                return None;
            }

            let title = conversation
                .title
                .clone()
                .unwrap_or_else(|| UNTITLED.to_string());
            let mut record = Record::new(conversation.record_id(), title, details.text)
                .with_snippet(details.snippet)
                .with_message_count(details.message_count);
            if let Some(t) = conversation.create_time {
                record = record.with_create_time(t);
            }
            Some(record)
        })
        .collect();

    info!(records = records.len(), "Normalized conversations");
    records
}
