use std::sync::Arc;

use augment_enrich::Embedder;
use augment_graph::GraphStore;
use augment_llm::Summarizer;

use crate::jobs::JobRegistry;

/// Shared application state behind every handler. The backing store and the
/// two AI services are trait objects so tests run the full surface against
/// in-memory fakes.
pub struct AppState {
    pub registry: JobRegistry,
    pub store: Arc<dyn GraphStore>,
    pub summarizer: Arc<Summarizer>,
    pub embedder: Arc<dyn Embedder>,
    pub batch_size: usize,
}
