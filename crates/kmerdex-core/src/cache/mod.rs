//! Multi-tier cache: a process-local high-frequency value set, a
//! cross-process tier other threads/processes can attach to, and LRU
//! memoization of per-query extraction and scoring work.

pub mod cross_process;
pub mod memo;
pub mod process_local;

pub use cross_process::CrossProcessCache;
pub use memo::{QueryKeyMemo, ScoreMemo};
pub use process_local::ProcessLocalCache;

use hashbrown::HashSet;

use crate::catalog::{AnalysisCatalog, GinIndexMeta};
use crate::config::Config;
use crate::error::{KmerError, KmerResult};

/// Ties the three cache tiers together for one table/column: attach (or
/// load) the cross-process set, validate it against the live
/// configuration, and materialize a process-local copy for fast repeated
/// lookups.
pub struct HighFreqCache {
    cross_process: CrossProcessCache,
    query_memo: QueryKeyMemo,
    score_memo: ScoreMemo,
}

impl HighFreqCache {
    /// Construct an empty multi-tier cache.
    #[must_use]
    pub fn new() -> Self {
        Self { cross_process: CrossProcessCache::new(), query_memo: QueryKeyMemo::default(), score_memo: ScoreMemo::default() }
    }

    /// Load (or attach to an already-loaded) process-local cache for
    /// `table_id`/`column_id`, validating the catalog's recorded
    /// configuration against the live `(k, b, r, N)` in `config` first.
    ///
    /// # Errors
    ///
    /// Returns [`KmerError::CacheNotLoaded`] if no index exists for this
    /// table/column, or [`KmerError::CacheConfigMismatch`] if the index was
    /// built with different parameters.
    pub fn load(
        &self,
        catalog: &dyn AnalysisCatalog,
        table_id: u64,
        column_id: u32,
        config: &Config,
        values_loader: impl FnOnce() -> HashSet<u64>,
    ) -> KmerResult<ProcessLocalCache> {
        let meta = catalog
            .index_meta(table_id, column_id)?
            .ok_or(KmerError::CacheNotLoaded { table_id, column_id })?;
        validate_meta(&meta, config)?;

        let values = self.cross_process.attach_or_load(table_id, column_id, values_loader);
        Ok(ProcessLocalCache::load(table_id, column_id, config, (*values).clone()))
    }

    /// The query-key-extraction memo table.
    #[must_use]
    pub fn query_memo(&self) -> &QueryKeyMemo {
        &self.query_memo
    }

    /// The per-(row, query) score memo table.
    #[must_use]
    pub fn score_memo(&self) -> &ScoreMemo {
        &self.score_memo
    }
}

impl Default for HighFreqCache {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_meta(meta: &GinIndexMeta, config: &Config) -> KmerResult<()> {
    CrossProcessCache::validate_index_meta(meta, config)
}
