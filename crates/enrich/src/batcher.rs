use std::sync::Arc;

use super::traits::{Embedder, EmbeddingError};

/// Collects (element id, text) pairs and embeds them in one batched call
/// once the batch is full. The returned pairs preserve insertion order:
/// vector `j` of the service response is paired with the id that was at
/// position `j` of the request.
pub struct EmbeddingBatcher {
    buffer: Vec<(String, String)>,
    batch_size: usize,
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingBatcher {
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            embedder,
        }
    }

    /// Add a record to the batch. Returns the embedded pairs if the batch
    /// became full (auto-flush).
    pub async fn add(
        &mut self,
        id: String,
        text: String,
    ) -> Result<Option<Vec<(String, Vec<f32>)>>, EmbeddingError> {
        self.buffer.push((id, text));
        if self.buffer.len() >= self.batch_size {
            Ok(Some(self.flush().await?))
        } else {
            Ok(None)
        }
    }

    /// Force-flush remaining items.
    pub async fn flush(&mut self) -> Result<Vec<(String, Vec<f32>)>, EmbeddingError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        let batch: Vec<(String, String)> = self.buffer.drain(..).collect();
        let texts: Vec<&str> = batch.iter().map(|(_, t)| t.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                sent: batch.len(),
                got: embeddings.len(),
            });
        }

        Ok(batch
            .into_iter()
            .zip(embeddings)
            .map(|((id, _), emb)| (id, emb))
            .collect())
    }

    /// Number of items currently buffered.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
