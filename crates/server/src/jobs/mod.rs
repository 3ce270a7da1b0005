//! Job lifecycle: shared status handles, the process-wide registry, and the
//! error taxonomy the drivers abort with.

mod articles;
mod batch;
mod purchase;
#[cfg(test)]
pub(crate) mod testing;

pub use articles::ArticleJob;
pub use batch::CommitBatch;
pub use purchase::PurchaseJob;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use augment_enrich::EmbeddingError;
use augment_graph::GraphError;
use augment_llm::LlmError;

/// Why a job stopped early. None of these are retried: the driver logs the
/// chain and freezes the status at its last checkpoint.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("source unavailable: {0}")]
    Source(#[source] GraphError),

    #[error("summarization failed: {0}")]
    Summarize(#[source] LlmError),

    #[error("embedding failed: {0}")]
    Embed(#[source] EmbeddingError),

    #[error("sink write failed: {0}")]
    Sink(#[source] GraphError),
}

#[derive(Debug)]
struct JobStatus {
    status: String,
    complete: bool,
}

/// Shared view of one running job. Written only by the job's own task,
/// read by any number of status pollers.
#[derive(Debug, Clone)]
pub struct JobHandle {
    inner: Arc<RwLock<JobStatus>>,
}

impl JobHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(JobStatus {
                status: "0 %".to_string(),
                complete: false,
            })),
        }
    }

    pub fn set_status(&self, status: String) {
        self.inner.write().unwrap().status = status;
    }

    /// Mark the job done. Called unconditionally when the driver returns,
    /// success or not, so pollers are never left waiting.
    pub fn finish(&self) {
        self.inner.write().unwrap().complete = true;
    }

    pub fn current_status(&self) -> String {
        self.inner.read().unwrap().status.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.inner.read().unwrap().complete
    }

    /// Status and completion read under one lock acquisition. The driver
    /// sets the terminal status before the complete flag, so a snapshot
    /// that observes completion always carries the terminal status —
    /// separate reads could interleave with the driver and pair a stale
    /// status with `complete == true`.
    pub fn snapshot(&self) -> (String, bool) {
        let inner = self.inner.read().unwrap();
        (inner.status.clone(), inner.complete)
    }
}

impl Default for JobHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide map from job id to handle. Entries are inserted at trigger
/// time and pruned lazily: the first status read that observes a completed
/// job removes it, so exactly one poll sees the terminal value. Jobs that
/// are never polled stay until process exit.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, JobHandle>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: String, handle: JobHandle) {
        self.jobs.write().unwrap().insert(id, handle);
    }

    /// Current status for a job id, pruning the entry if the job has
    /// completed. `None` means unknown or already pruned.
    pub fn status(&self, id: &str) -> Option<String> {
        let mut jobs = self.jobs.write().unwrap();
        let handle = jobs.get(id)?;
        let (status, complete) = handle.snapshot();
        if complete {
            jobs.remove(id);
        }
        Some(status)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().unwrap().is_empty()
    }
}

/// Percent-complete string, computed strictly from records committed so far.
/// An empty job is already at 100.
pub(crate) fn percent(done: usize, total: usize) -> String {
    if total == 0 {
        "100 %".to_string()
    } else {
        format!("{} %", done * 100 / total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_formatting() {
        assert_eq!(percent(0, 250), "0 %");
        assert_eq!(percent(100, 250), "40 %");
        assert_eq!(percent(200, 250), "80 %");
        assert_eq!(percent(250, 250), "100 %");
        assert_eq!(percent(0, 0), "100 %");
    }

    #[test]
    fn registry_prunes_on_first_completed_read() {
        let registry = JobRegistry::new();
        let handle = JobHandle::new();
        registry.insert("job-1".to_string(), handle.clone());

        handle.set_status("40 %".to_string());
        assert_eq!(registry.status("job-1").as_deref(), Some("40 %"));
        assert_eq!(registry.len(), 1);

        handle.set_status("100 %".to_string());
        handle.finish();

        // One poll sees the terminal status, the next finds nothing.
        assert_eq!(registry.status("job-1").as_deref(), Some("100 %"));
        assert_eq!(registry.status("job-1"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_unknown_id() {
        let registry = JobRegistry::new();
        assert_eq!(registry.status("nope"), None);
    }

    #[test]
    fn snapshot_pairs_status_with_completion() {
        let handle = JobHandle::new();
        assert_eq!(handle.snapshot(), ("0 %".to_string(), false));

        handle.set_status("100 %".to_string());
        handle.finish();
        assert_eq!(handle.snapshot(), ("100 %".to_string(), true));
    }

    #[test]
    fn pruning_poll_always_returns_terminal_status() {
        // The driver sets the terminal status before the complete flag, so
        // the poll that prunes the entry must hand out "100 %" — never a
        // stale checkpoint paired with a completed flag.
        for _ in 0..50 {
            let registry = JobRegistry::new();
            let handle = JobHandle::new();
            registry.insert("job".to_string(), handle.clone());

            let driver = std::thread::spawn(move || {
                for pct in ["20 %", "40 %", "60 %", "80 %"] {
                    handle.set_status(pct.to_string());
                }
                handle.set_status("100 %".to_string());
                handle.finish();
            });

            let mut last = None;
            while let Some(status) = registry.status("job") {
                last = Some(status);
            }
            driver.join().unwrap();

            assert_eq!(last.as_deref(), Some("100 %"));
            assert!(registry.is_empty());
        }
    }
}
