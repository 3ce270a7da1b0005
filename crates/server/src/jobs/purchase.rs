use std::sync::Arc;

use tracing::{error, info};

use augment_core::EnrichmentResult;
use augment_enrich::Embedder;
use augment_graph::GraphStore;
use augment_llm::Summarizer;

use super::{percent, CommitBatch, JobError, JobHandle};

/// Summarize-then-embed driver: one job run over the customer purchase
/// relationships of a season range. Per record, one chat round trip for the
/// summary and one single-text embedding call, committed in batches onto
/// the relationships.
pub struct PurchaseJob {
    store: Arc<dyn GraphStore>,
    summarizer: Arc<Summarizer>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    start_season: String,
    end_season: String,
}

impl PurchaseJob {
    pub fn new(
        store: Arc<dyn GraphStore>,
        summarizer: Arc<Summarizer>,
        embedder: Arc<dyn Embedder>,
        batch_size: usize,
        start_season: String,
        end_season: String,
    ) -> Self {
        Self {
            store,
            summarizer,
            embedder,
            batch_size,
            start_season,
            end_season,
        }
    }

    /// Drive the job to completion. Errors never escape: they are logged,
    /// the status freezes at its last checkpoint, and `complete` is set
    /// regardless so the poller always gets a terminal answer.
    pub async fn run(&self, handle: &JobHandle) {
        match self.execute(handle).await {
            Ok(()) => info!(
                "purchase augment {}..{} complete",
                self.start_season, self.end_season
            ),
            Err(e) => error!(
                "purchase augment {}..{} aborted: {:#}",
                self.start_season,
                self.end_season,
                anyhow::Error::from(e)
            ),
        }
        handle.finish();
    }

    async fn execute(&self, handle: &JobHandle) -> Result<(), JobError> {
        let records = self
            .store
            .fetch_purchase_paths(&self.start_season, &self.end_season)
            .await
            .map_err(JobError::Source)?;
        let total = records.len();
        info!("fetched {} purchase paths pending embedding", total);

        let mut batch = CommitBatch::new(self.batch_size);
        let mut done = 0usize;

        for record in records {
            let summary = self
                .summarizer
                .summarize(&record.text)
                .await
                .map_err(JobError::Summarize)?;
            let embedding = self
                .embedder
                .embed(&summary)
                .await
                .map_err(JobError::Embed)?;
            batch.push(EnrichmentResult {
                id: record.id,
                embedding,
                summary: Some(summary),
            });

            if batch.is_full() {
                self.commit(&mut batch, &mut done, total, handle).await?;
            }
        }

        if !batch.is_empty() {
            self.commit(&mut batch, &mut done, total, handle).await?;
        }

        handle.set_status("100 %".to_string());
        Ok(())
    }

    async fn commit(
        &self,
        batch: &mut CommitBatch,
        done: &mut usize,
        total: usize,
        handle: &JobHandle,
    ) -> Result<(), JobError> {
        self.store
            .write_purchase_embeddings(batch.rows())
            .await
            .map_err(JobError::Sink)?;
        *done += batch.len();
        batch.clear();
        handle.set_status(percent(*done, total));
        info!("committed {}/{} purchase embeddings", done, total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::{records, FakeChat, FakeEmbedder, FakeStore};

    fn job(store: Arc<FakeStore>, chat: FakeChat, embedder: FakeEmbedder) -> PurchaseJob {
        PurchaseJob::new(
            store,
            Arc::new(Summarizer::new(Arc::new(chat), 0.0, 256)),
            Arc::new(embedder),
            100,
            "S2019".to_string(),
            "S2020".to_string(),
        )
    }

    #[tokio::test]
    async fn commits_in_batches_and_reaches_100() {
        let store = Arc::new(FakeStore::with_records(records(250)));
        let handle = JobHandle::new();

        job(store.clone(), FakeChat::new(), FakeEmbedder::new())
            .run(&handle)
            .await;

        assert_eq!(store.write_sizes(), vec![100, 100, 50]);
        assert_eq!(handle.current_status(), "100 %");
        assert!(handle.is_complete());

        // Summaries and embeddings land on the ids they were computed for.
        let writes = store.writes.lock().unwrap();
        let first = &writes[0][0];
        assert_eq!(first.id, "el-0");
        assert!(first.summary.as_deref().unwrap().contains("article text 0"));
        assert_eq!(first.embedding.len(), 2);
    }

    #[tokio::test]
    async fn enrichment_failure_freezes_status_after_last_flush() {
        let store = Arc::new(FakeStore::with_records(records(250)));
        let handle = JobHandle::new();

        // Chat call 101 fails: the first batch of 100 is already committed.
        job(store.clone(), FakeChat::failing_at(101), FakeEmbedder::new())
            .run(&handle)
            .await;

        assert_eq!(store.write_sizes(), vec![100]);
        assert_eq!(handle.current_status(), "40 %");
        assert!(handle.is_complete());
    }

    #[tokio::test]
    async fn source_failure_marks_complete_at_zero() {
        let store = Arc::new(FakeStore::failing_fetch());
        let handle = JobHandle::new();

        job(store.clone(), FakeChat::new(), FakeEmbedder::new())
            .run(&handle)
            .await;

        assert!(store.write_sizes().is_empty());
        assert_eq!(handle.current_status(), "0 %");
        assert!(handle.is_complete());
    }

    #[tokio::test]
    async fn sink_failure_aborts_without_losing_later_batches() {
        let store = Arc::new(FakeStore::with_records(records(250)).fail_write_at(1));
        let handle = JobHandle::new();

        job(store.clone(), FakeChat::new(), FakeEmbedder::new())
            .run(&handle)
            .await;

        // First write landed, second failed, nothing after.
        assert_eq!(store.write_sizes(), vec![100]);
        assert_eq!(handle.current_status(), "40 %");
        assert!(handle.is_complete());
    }

    #[tokio::test]
    async fn empty_record_set_is_immediately_complete() {
        let store = Arc::new(FakeStore::with_records(Vec::new()));
        let handle = JobHandle::new();

        job(store.clone(), FakeChat::new(), FakeEmbedder::new())
            .run(&handle)
            .await;

        assert!(store.write_sizes().is_empty());
        assert_eq!(handle.current_status(), "100 %");
        assert!(handle.is_complete());
    }
}
