//! Attach embeddings to records.

use tracing::{debug, info, instrument};

use convo_types::Record;

use crate::error::EmbeddingError;
use crate::model::EmbeddingModel;

/// Default number of texts per model call
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Embed every record with non-blank text, `batch_size` texts at a time.
///
/// Records with blank text keep an empty embedding, which marks them invalid
/// for graph building. Returns how many records were embedded.
#[instrument(skip_all, fields(records = records.len(), model = %model.info().name))]
pub fn embed_records<M: EmbeddingModel + ?Sized>(
    model: &M,
    records: &mut [Record],
    batch_size: usize,
) -> Result<usize, EmbeddingError> {
    if batch_size == 0 {
        return Err(EmbeddingError::InvalidInput(
            "batch_size must be > 0".to_string(),
        ));
    }

    let pending: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.text.trim().is_empty())
        .map(|(i, _)| i)
        .collect();
    if pending.len() < records.len() {
        debug!(
            skipped = records.len() - pending.len(),
            "Skipping records with blank text"
        );
    }

    for (batch, chunk) in pending.chunks(batch_size).enumerate() {
        let texts: Vec<&str> = chunk.iter().map(|&i| records[i].text.as_str()).collect();
        let embeddings = model.embed_batch(&texts)?;
        if embeddings.len() != chunk.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: chunk.len(),
                actual: embeddings.len(),
            });
        }

        for (&i, embedding) in chunk.iter().zip(embeddings) {
            records[i].embedding = embedding.into_values();
        }
        debug!(batch, size = chunk.len(), "Embedded batch");
    }

    info!(embedded = pending.len(), "Embedding complete");
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingEmbedder;
    use crate::model::{Embedding, ModelInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        info: ModelInfo,
        calls: AtomicUsize,
    }

    impl EmbeddingModel for CountingModel {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(Embedding::new(vec![text.len() as f32, 1.0]))
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            texts.iter().map(|t| self.embed(t)).collect()
        }
    }

    struct ShortModel(ModelInfo);

    impl EmbeddingModel for ShortModel {
        fn info(&self) -> &ModelInfo {
            &self.0
        }

        fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(Embedding::zeros(1))
        }

        fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
            Ok(vec![])
        }
    }

    fn info() -> ModelInfo {
        ModelInfo {
            name: "test".to_string(),
            dimension: 2,
            max_sequence_length: 0,
        }
    }

    fn records(texts: &[&str]) -> Vec<Record> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Record::new(None, format!("t{}", i), *t))
            .collect()
    }

    #[test]
    fn test_batches_and_blank_text() {
        let model = CountingModel {
            info: info(),
            calls: AtomicUsize::new(0),
        };
        let mut recs = records(&["a", "  ", "bb", "ccc", "", "dddd", "e"]);

        let embedded = embed_records(&model, &mut recs, 2).unwrap();

        assert_eq!(embedded, 5);
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
        assert!(recs[1].embedding.is_empty());
        assert!(recs[4].embedding.is_empty());
        assert_eq!(recs[0].dimension(), 2);
        assert!(recs[5].is_valid());
    }

    #[test]
    fn test_zero_batch_size() {
        let model = HashingEmbedder::default();
        let mut recs = records(&["a"]);
        assert!(embed_records(&model, &mut recs, 0).is_err());
    }

    #[test]
    fn test_count_mismatch() {
        let mut recs = records(&["hello"]);
        let err = embed_records(&ShortModel(info()), &mut recs, 4).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn test_boxed_model() {
        let model: Box<dyn EmbeddingModel> = Box::new(HashingEmbedder::default());
        let mut recs = records(&["garden tomatoes", "tomato garden"]);
        assert_eq!(embed_records(model.as_ref(), &mut recs, 32).unwrap(), 2);
        assert_eq!(recs[0].dimension(), 384);
    }
}
