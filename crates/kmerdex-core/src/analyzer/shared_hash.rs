//! The analyzer's shared hash table and error slot.
//!
//! The reference system builds this on dynamic shared memory attached by
//! each worker process. Here a single process hosts every worker as a
//! `rayon` task, so a lock-free concurrent map stands in for the shared
//! memory segment; the create/attach/detach/destroy lifecycle those workers
//! would perform on a real segment is kept as explicit methods so the
//! leader/worker split reads the same way regardless of which backs it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;

/// Maximum length, in bytes, of the message retained in an [`ErrorSlot`].
pub const ERROR_SLOT_CAPACITY: usize = 256;

/// Distinct-row counts for every k-mer value observed so far in this
/// analysis run, keyed by the raw integer (or, for `k > 32`, hash) value.
#[derive(Debug, Default)]
pub struct SharedHash {
    counts: DashMap<u64, u64>,
}

impl SharedHash {
    /// Create a fresh, empty shared hash (`CreateContext`).
    #[must_use]
    pub fn create() -> Self {
        Self::default()
    }

    /// Increment the distinct-row count for `value` by one. Called at most
    /// once per row per distinct value, since the caller has already
    /// deduplicated within the row.
    pub fn record_row_occurrence(&self, value: u64) {
        *self.counts.entry(value).or_insert(0) += 1;
    }

    /// Merge another worker's counts into this one. Workers in this engine
    /// share the same map directly, so this is only needed when a worker
    /// accumulates into a private map before a final merge; kept for
    /// parity with the leader's per-worker-then-merge option.
    pub fn merge(&self, other: &Self) {
        for entry in &other.counts {
            *self.counts.entry(*entry.key()).or_insert(0) += *entry.value();
        }
    }

    /// Every recorded (value, row_count) pair strictly above `threshold`. A
    /// count exactly equal to `threshold` does not qualify.
    #[must_use]
    pub fn above_threshold(&self, threshold: u64) -> Vec<(u64, u64)> {
        self.counts.iter().filter(|entry| *entry.value() > threshold).map(|entry| (*entry.key(), *entry.value())).collect()
    }

    /// Total number of distinct k-mer values recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no values have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Release this run's shared state (`DestroyContext`). A no-op for the
    /// in-process map; present so the leader's suspension-point sequence
    /// stays structurally identical to the reference design.
    pub fn destroy(self) {
        drop(self);
    }
}

/// First-writer-wins shared error slot: the first worker to report a
/// failure wins; later reports are silently dropped, matching the
/// exception-free worker discipline (workers never panic or unwind, they
/// report and return).
#[derive(Debug, Default)]
pub struct ErrorSlot {
    written: AtomicBool,
    message: Mutex<Option<String>>,
    cancelled: AtomicBool,
}

impl ErrorSlot {
    /// Create an empty error slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a failure, truncating to [`ERROR_SLOT_CAPACITY`] bytes. Only
    /// the first call wins; subsequent calls are no-ops. Also raises the
    /// cooperative cancellation flag so other workers stop early.
    pub fn report(&self, message: &str) {
        if self.written.swap(true, Ordering::AcqRel) {
            return;
        }
        let truncated: String = message.chars().take(ERROR_SLOT_CAPACITY).collect();
        #[allow(clippy::unwrap_used)]
        let mut slot = self.message.lock().unwrap();
        *slot = Some(truncated);
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether a worker should stop scanning: either it or a sibling worker
    /// has already reported a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation without recording an error, e.g. when the
    /// leader itself decides to abandon the run.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// The first reported error message, if any.
    #[must_use]
    pub fn take_message(&self) -> Option<String> {
        #[allow(clippy::unwrap_used)]
        self.message.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_threshold_excludes_exact_threshold_counts() {
        let hash = SharedHash::create();
        hash.record_row_occurrence(7);
        hash.record_row_occurrence(7); // count 2, equals threshold, excluded
        hash.record_row_occurrence(9);
        hash.record_row_occurrence(9);
        hash.record_row_occurrence(9); // count 3, exceeds threshold, included
        assert_eq!(hash.above_threshold(2), vec![(9, 3)]);
    }

    #[test]
    fn error_slot_is_first_writer_wins() {
        let slot = ErrorSlot::new();
        slot.report("first failure");
        slot.report("second failure");
        assert_eq!(slot.take_message().as_deref(), Some("first failure"));
        assert!(slot.is_cancelled());
    }

    #[test]
    fn error_slot_truncates_to_capacity() {
        let slot = ErrorSlot::new();
        let long = "x".repeat(ERROR_SLOT_CAPACITY * 2);
        slot.report(&long);
        assert_eq!(slot.take_message().unwrap().len(), ERROR_SLOT_CAPACITY);
    }
}
