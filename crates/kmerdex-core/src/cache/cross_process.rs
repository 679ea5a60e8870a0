//! Cross-process tier: high-frequency value sets shared across every
//! backend that queries the same table/column, keyed so a cold process can
//! attach to an already-loaded set instead of rescanning the catalog.
//!
//! The reference system backs this with a named dynamic shared memory
//! segment attached by table/column key. This engine has no multi-process
//! boundary to cross, so a `DashMap` keyed the same way stands in: any
//! thread can attach to a set another thread populated, and the lifecycle
//! (load once, read many, evict on config drift) is identical either way.

use std::sync::Arc;

use hashbrown::HashSet;

use dashmap::DashMap;

use crate::catalog::GinIndexMeta;
use crate::config::Config;
use crate::error::{KmerError, KmerResult};

/// Shared high-frequency value sets, keyed by `(table_id, column_id)`.
#[derive(Debug, Default)]
pub struct CrossProcessCache {
    entries: DashMap<(u64, u32), Arc<HashSet<u64>>>,
}

impl CrossProcessCache {
    /// Create an empty cross-process cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the shared value set for `table_id`/`column_id`, loading
    /// it via `loader` if no process has attached yet.
    pub fn attach_or_load(&self, table_id: u64, column_id: u32, loader: impl FnOnce() -> HashSet<u64>) -> Arc<HashSet<u64>> {
        self.entries.entry((table_id, column_id)).or_insert_with(|| Arc::new(loader())).clone()
    }

    /// Detach (evict) the shared set for a table/column, e.g. after its
    /// analysis is superseded.
    pub fn detach(&self, table_id: u64, column_id: u32) {
        self.entries.remove(&(table_id, column_id));
    }

    /// Validate a loaded index's on-disk configuration against the live
    /// `(k, b, r, N)` configuration before trusting its cached values. This
    /// prevents a cache populated under one configuration from being used
    /// by a query under another, where the k-mer key encodings would
    /// mismatch silently.
    ///
    /// # Errors
    ///
    /// Returns [`KmerError::CacheConfigMismatch`] on any field drift.
    pub fn validate_index_meta(meta: &GinIndexMeta, config: &Config) -> KmerResult<()> {
        if meta.kmer_size != config.kmer_size {
            return Err(KmerError::CacheConfigMismatch { field: "kmer_size" });
        }
        if meta.occurrence_bits != config.occurrence_bits {
            return Err(KmerError::CacheConfigMismatch { field: "occurrence_bits" });
        }
        #[allow(clippy::float_cmp)]
        let rate_drifted = meta.max_appearance_rate != config.max_appearance_rate;
        if rate_drifted {
            return Err(KmerError::CacheConfigMismatch { field: "max_appearance_rate" });
        }
        if meta.max_appearance_rows != config.max_appearance_rows {
            return Err(KmerError::CacheConfigMismatch { field: "max_appearance_rows" });
        }
        Ok(())
    }
}
