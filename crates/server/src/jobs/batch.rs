use augment_core::EnrichmentResult;

/// Bounded buffer of enrichment results awaiting one commit transaction.
///
/// The caller clears it only after the sink write succeeded; a failed write
/// leaves the rows in place so computed work is never silently dropped, and
/// the job aborts instead.
pub struct CommitBatch {
    rows: Vec<EnrichmentResult>,
    capacity: usize,
}

impl CommitBatch {
    pub fn new(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, result: EnrichmentResult) {
        debug_assert!(self.rows.len() < self.capacity);
        self.rows.push(result);
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[EnrichmentResult] {
        &self.rows
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
