use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding count mismatch: sent {sent} texts, got {got} vectors")]
    CountMismatch { sent: usize, got: usize },
}

/// Trait for embedding backends (OpenAI-compatible, local, etc.)
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text. The
    /// vector at position `j` always belongs to the text at position `j`.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors
            .pop()
            .ok_or(EmbeddingError::CountMismatch { sent: 1, got: 0 })
    }

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;
}
