//! Record id resolution.
//!
//! Every node needs a unique, non-empty key. Supplied ids are kept as-is and
//! must not collide; records without one get a surrogate built from their
//! input position and a murmur3 hash of their title and text, so the same
//! input always yields the same surrogates.

use std::collections::HashSet;

use murmur3::murmur3_x86_128;
use tracing::debug;

use convo_types::{Record, RecordId};

use crate::error::GraphError;

/// Resolve one id per `(position, record)` pair, in order.
///
/// `position` is the record's index in the caller's original input and
/// feeds the surrogate id.
///
/// # Errors
///
/// Returns `DuplicateId` when two records supply the same id.
pub fn resolve_ids(records: &[(usize, &Record)]) -> Result<Vec<RecordId>, GraphError> {
    let mut taken: HashSet<RecordId> = HashSet::with_capacity(records.len());
    for (_, record) in records {
        if let Some(id) = usable_id(record) {
            if !taken.insert(id.clone()) {
                return Err(GraphError::DuplicateId(id.clone()));
            }
        }
    }

    let mut resolved = Vec::with_capacity(records.len());
    for &(position, record) in records {
        match usable_id(record) {
            Some(id) => resolved.push(id.clone()),
            None => {
                let id = surrogate_id(position, record, &taken)?;
                debug!(position, id = %id, "Synthesized record id");
                taken.insert(id.clone());
                resolved.push(id);
            }
        }
    }

    Ok(resolved)
}

/// Supplied id, unless absent or blank.
fn usable_id(record: &Record) -> Option<&RecordId> {
    match &record.id {
        Some(RecordId::Text(text)) if text.trim().is_empty() => None,
        other => other.as_ref(),
    }
}

fn surrogate_id(
    position: usize,
    record: &Record,
    taken: &HashSet<RecordId>,
) -> Result<RecordId, GraphError> {
    let content = format!("{}\u{1f}{}", record.title, record.text);
    let hash = murmur3_x86_128(&mut content.as_bytes(), 0).map_err(|e| {
        GraphError::InvalidRecord {
            position,
            reason: e.to_string(),
        }
    })?;

    let base = format!("conv-{}-{:016x}", position, (hash >> 64) as u64);
    let mut candidate = RecordId::Text(base.clone());
    let mut suffix = 1;
    while taken.contains(&candidate) {
        candidate = RecordId::Text(format!("{}-{}", base, suffix));
        suffix += 1;
    }
    Ok(candidate)
}
