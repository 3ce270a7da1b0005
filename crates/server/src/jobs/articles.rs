use std::sync::Arc;

use tracing::{error, info};

use augment_core::EnrichmentResult;
use augment_enrich::{Embedder, EmbeddingBatcher};
use augment_graph::GraphStore;

use super::{percent, JobError, JobHandle};

/// Direct-embed driver: one job run over the article nodes still missing an
/// embedding. Raw descriptions are embedded through the batched endpoint —
/// one service call per batch — and each response vector is paired with the
/// id at the same position before the batch is committed onto the nodes.
pub struct ArticleJob {
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl ArticleJob {
    pub fn new(store: Arc<dyn GraphStore>, embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self {
            store,
            embedder,
            batch_size,
        }
    }

    /// Drive the job to completion; errors are logged and terminal, never
    /// surfaced to the poller except as a status frozen below "100 %".
    pub async fn run(&self, handle: &JobHandle) {
        match self.execute(handle).await {
            Ok(()) => info!("article augment complete"),
            Err(e) => error!("article augment aborted: {:#}", anyhow::Error::from(e)),
        }
        handle.finish();
    }

    async fn execute(&self, handle: &JobHandle) -> Result<(), JobError> {
        let records = self
            .store
            .fetch_articles()
            .await
            .map_err(JobError::Source)?;
        let total = records.len();
        info!("fetched {} articles pending embedding", total);

        let mut batcher = EmbeddingBatcher::new(self.embedder.clone(), self.batch_size);
        let mut done = 0usize;

        for record in records {
            if let Some(pairs) = batcher
                .add(record.id, record.text)
                .await
                .map_err(JobError::Embed)?
            {
                self.commit(pairs, &mut done, total, handle).await?;
            }
        }

        let pairs = batcher.flush().await.map_err(JobError::Embed)?;
        if !pairs.is_empty() {
            self.commit(pairs, &mut done, total, handle).await?;
        }

        handle.set_status("100 %".to_string());
        Ok(())
    }

    async fn commit(
        &self,
        pairs: Vec<(String, Vec<f32>)>,
        done: &mut usize,
        total: usize,
        handle: &JobHandle,
    ) -> Result<(), JobError> {
        let rows: Vec<EnrichmentResult> = pairs
            .into_iter()
            .map(|(id, embedding)| EnrichmentResult {
                id,
                embedding,
                summary: None,
            })
            .collect();

        self.store
            .write_article_embeddings(&rows)
            .await
            .map_err(JobError::Sink)?;
        *done += rows.len();
        handle.set_status(percent(*done, total));
        info!("committed {}/{} article embeddings", done, total);
        Ok(())
    }
}
