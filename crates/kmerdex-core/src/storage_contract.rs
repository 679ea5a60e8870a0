//! Traits modeling the host collaborators this crate never implements
//! itself: the table lock manager, the block/row reader, the out-of-line
//! ("TOASTed") datum expander, and the parallel-worker launcher. The
//! analyzer's leader depends on these abstractly so that swapping in a real
//! storage engine never touches extraction, scoring, or analyzer logic.

use crate::error::KmerResult;

/// One row's worth of encoded sequence bytes plus the codec width it was
/// packed with, as handed to the analyzer by the block reader.
#[derive(Debug, Clone)]
pub struct EncodedRow {
    /// Row identifier within the scanned table/column, used only for
    /// diagnostics; the analyzer itself is row-identity-agnostic.
    pub row_id: u64,
    /// The row's packed base codes, already TOAST-expanded.
    pub codes: Vec<u8>,
    /// Codec width (2 or 4) the codes were packed with.
    pub width: u8,
}

/// Acquires and releases the table-level lock held for the duration of an
/// analysis run, per the `ReleaseTableLock` suspension point.
pub trait TableLock {
    /// Acquire the lock. Blocks until available.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired (e.g. the host
    /// reports a deadlock or timeout).
    fn acquire(&self, table_id: u64) -> KmerResult<()>;

    /// Release a previously acquired lock.
    fn release(&self, table_id: u64);
}

/// Reads batches of rows from a table column for analysis, expanding any
/// out-of-line ("TOASTed") storage representation before the analyzer ever
/// sees the bytes.
pub trait BlockReader {
    /// Read up to `batch_size` rows starting at `offset`. Returns fewer than
    /// `batch_size` rows only at the end of the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage read fails.
    fn read_batch(&self, table_id: u64, column_id: u32, offset: u64, batch_size: u32) -> KmerResult<Vec<EncodedRow>>;

    /// Total row count for the table/column, used to compute the
    /// high-frequency threshold before scanning begins.
    ///
    /// # Errors
    ///
    /// Returns an error if the row count is unavailable.
    fn row_count(&self, table_id: u64, column_id: u32) -> KmerResult<u64>;
}

/// Runs a batch of work items to completion, one way or another. The
/// reference system launches OS worker processes under a dynamic shared
/// memory segment; this trait abstracts that so the analyzer's leader can
/// be driven by a local thread pool in this engine without depending on a
/// concrete process model.
pub trait WorkerLauncher {
    /// Run `task` once per item in `batches`, blocking until every
    /// invocation has returned. Corresponds to the
    /// `LaunchWorkers -> Wait` suspension points.
    fn launch_and_wait<T, F>(&self, batches: Vec<T>, task: F)
    where
        T: Send,
        F: Fn(T) + Sync + Send;
}

/// A [`WorkerLauncher`] backed by `rayon`'s global thread pool, standing in
/// for the host's OS-process worker launcher in this engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayonLauncher;

impl WorkerLauncher for RayonLauncher {
    fn launch_and_wait<T, F>(&self, batches: Vec<T>, task: F)
    where
        T: Send,
        F: Fn(T) + Sync + Send,
    {
        use rayon::prelude::*;
        batches.into_par_iter().for_each(task);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use super::{BlockReader, EncodedRow, KmerResult, TableLock};

    /// An in-memory table lock for tests: never contends, just tracks
    /// whether it's currently held.
    #[derive(Debug, Default)]
    pub struct MemoryTableLock {
        held: Mutex<bool>,
    }

    impl TableLock for MemoryTableLock {
        fn acquire(&self, _table_id: u64) -> KmerResult<()> {
            #[allow(clippy::unwrap_used)]
            let mut held = self.held.lock().unwrap();
            *held = true;
            Ok(())
        }

        fn release(&self, _table_id: u64) {
            #[allow(clippy::unwrap_used)]
            let mut held = self.held.lock().unwrap();
            *held = false;
        }
    }

    /// An in-memory block reader serving a fixed set of rows, for tests.
    #[derive(Debug, Default)]
    pub struct MemoryBlockReader {
        pub rows: Vec<EncodedRow>,
    }

    impl BlockReader for MemoryBlockReader {
        fn read_batch(&self, _table_id: u64, _column_id: u32, offset: u64, batch_size: u32) -> KmerResult<Vec<EncodedRow>> {
            let start = offset as usize;
            let end = (start + batch_size as usize).min(self.rows.len());
            if start >= self.rows.len() {
                return Ok(Vec::new());
            }
            Ok(self.rows[start..end].to_vec())
        }

        fn row_count(&self, _table_id: u64, _column_id: u32) -> KmerResult<u64> {
            Ok(self.rows.len() as u64)
        }
    }
}
