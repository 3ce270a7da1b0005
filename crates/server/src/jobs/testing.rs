//! Shared fakes for the job driver tests: an in-memory graph store and
//! failable chat/embedding backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use augment_core::{EnrichmentResult, Record};
use augment_enrich::{Embedder, EmbeddingError};
use augment_graph::{GraphError, GraphStore};
use augment_llm::{LlmError, LlmProvider, Message};

pub(crate) fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::new(format!("el-{i}"), format!("article text {i}")))
        .collect()
}

/// In-memory store: serves a fixed record set, logs every write, keeps a
/// per-id property map with last-write-wins semantics (the real sink's
/// `SET` behavior), and can be told to fail fetches or the nth write
/// (0-based).
pub(crate) struct FakeStore {
    records: Vec<Record>,
    pub writes: Mutex<Vec<Vec<EnrichmentResult>>>,
    pub properties: Mutex<HashMap<String, EnrichmentResult>>,
    fail_fetch: bool,
    fail_write_at: Option<usize>,
}

impl FakeStore {
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            writes: Mutex::new(Vec::new()),
            properties: Mutex::new(HashMap::new()),
            fail_fetch: false,
            fail_write_at: None,
        }
    }

    pub fn failing_fetch() -> Self {
        let mut store = Self::with_records(Vec::new());
        store.fail_fetch = true;
        store
    }

    pub fn fail_write_at(mut self, n: usize) -> Self {
        self.fail_write_at = Some(n);
        self
    }

    pub fn write_sizes(&self) -> Vec<usize> {
        self.writes.lock().unwrap().iter().map(|w| w.len()).collect()
    }

    fn fetch(&self) -> Result<Vec<Record>, GraphError> {
        if self.fail_fetch {
            return Err(GraphError::MalformedRow("store down".into()));
        }
        Ok(self.records.clone())
    }

    fn write(&self, rows: &[EnrichmentResult]) -> Result<(), GraphError> {
        let mut writes = self.writes.lock().unwrap();
        if self.fail_write_at == Some(writes.len()) {
            return Err(GraphError::Cypher {
                code: "Neo.TransientError.Transaction.Terminated".into(),
                message: "write failed".into(),
            });
        }
        let mut properties = self.properties.lock().unwrap();
        for row in rows {
            properties.insert(row.id.clone(), row.clone());
        }
        writes.push(rows.to_vec());
        Ok(())
    }
}

#[async_trait]
impl GraphStore for FakeStore {
    async fn fetch_purchase_paths(
        &self,
        _start_season: &str,
        _end_season: &str,
    ) -> Result<Vec<Record>, GraphError> {
        self.fetch()
    }

    async fn fetch_articles(&self) -> Result<Vec<Record>, GraphError> {
        self.fetch()
    }

    async fn write_purchase_embeddings(
        &self,
        rows: &[EnrichmentResult],
    ) -> Result<(), GraphError> {
        self.write(rows)
    }

    async fn write_article_embeddings(&self, rows: &[EnrichmentResult]) -> Result<(), GraphError> {
        self.write(rows)
    }
}

/// Chat backend that echoes the user message, failing on the nth call
/// (1-based) when told to.
pub(crate) struct FakeChat {
    calls: AtomicUsize,
    fail_at: Option<usize>,
}

impl FakeChat {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_at: None,
        }
    }

    pub fn failing_at(n: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_at: Some(n),
        }
    }
}

#[async_trait]
impl LlmProvider for FakeChat {
    async fn complete(
        &self,
        messages: Vec<Message>,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at == Some(call) {
            return Err(LlmError::ApiError {
                status: 429,
                body: "rate limited".into(),
            });
        }
        Ok(format!("summary of {}", messages.last().unwrap().content))
    }
}

/// Embedder producing per-text distinguishable vectors `[len, batch position]`;
/// fails on the nth embed_batch call (1-based) when told to.
pub(crate) struct FakeEmbedder {
    calls: AtomicUsize,
    fail_at: Option<usize>,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_at: None,
        }
    }

    pub fn failing_at(n: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_at: Some(n),
        }
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at == Some(call) {
            return Err(EmbeddingError::Api("embedding backend down".into()));
        }
        Ok(texts
            .iter()
            .enumerate()
            .map(|(j, t)| vec![t.len() as f32, j as f32])
            .collect())
    }

    fn dimensions(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, embedding: Vec<f32>, summary: Option<&str>) -> EnrichmentResult {
        EnrichmentResult {
            id: id.to_string(),
            embedding,
            summary: summary.map(String::from),
        }
    }

    #[tokio::test]
    async fn sink_rewrite_of_same_id_keeps_second_write() {
        let store = FakeStore::with_records(Vec::new());

        store
            .write_purchase_embeddings(&[row("el-1", vec![1.0], Some("first"))])
            .await
            .unwrap();
        store
            .write_purchase_embeddings(&[row("el-1", vec![2.0], Some("second"))])
            .await
            .unwrap();

        // Last write wins: one entry for the id, carrying the second values.
        let properties = store.properties.lock().unwrap();
        assert_eq!(properties.len(), 1);
        let kept = &properties["el-1"];
        assert_eq!(kept.embedding, vec![2.0]);
        assert_eq!(kept.summary.as_deref(), Some("second"));
    }
}
