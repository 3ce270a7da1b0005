use async_trait::async_trait;
use thiserror::Error;

use augment_core::{EnrichmentResult, Record};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cypher error {code}: {message}")]
    Cypher { code: String, message: String },

    #[error("malformed result row: {0}")]
    MalformedRow(String),

    #[error("invalid relationship type '{0}'")]
    InvalidRelationshipType(String),
}

/// The backing-store contract the job drivers run against: one bounded read
/// per job invocation, one atomic write transaction per batch.
///
/// Reads filter to elements whose `embedding` property is still unset, so a
/// re-triggered job picks up whatever a previous capped run left behind.
/// Writes are last-write-wins per element id.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Customer purchase paths for the season relationship range, one record
    /// per relationship, text = ordered aggregated article descriptions.
    async fn fetch_purchase_paths(
        &self,
        start_season: &str,
        end_season: &str,
    ) -> Result<Vec<Record>, GraphError>;

    /// Article nodes still missing an embedding, text = article description.
    async fn fetch_articles(&self) -> Result<Vec<Record>, GraphError>;

    /// Write summary + vector onto the purchase relationships, one
    /// transaction for the whole batch.
    async fn write_purchase_embeddings(
        &self,
        rows: &[EnrichmentResult],
    ) -> Result<(), GraphError>;

    /// Write vectors onto the article nodes, one transaction for the whole
    /// batch.
    async fn write_article_embeddings(&self, rows: &[EnrichmentResult]) -> Result<(), GraphError>;
}
