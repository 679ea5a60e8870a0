//! Process-local tier: the high-frequency value set for one table/column,
//! loaded once by a single writer and read many times thereafter. The
//! reference system keeps this in process-private memory rather than the
//! cross-process shared segment because every backend process ends up
//! wanting the same immutable set and re-attaching shared memory per query
//! would cost more than just copying it once.

use hashbrown::HashSet;

use crate::config::Config;
use crate::error::{KmerError, KmerResult};

/// An immutable, process-local high-frequency value set for one
/// table/column/k combination.
#[derive(Debug, Clone)]
pub struct ProcessLocalCache {
    table_id: u64,
    column_id: u32,
    kmer_size: u32,
    occurrence_bits: u32,
    max_appearance_rate: f64,
    max_appearance_rows: u64,
    values: HashSet<u64>,
}

impl ProcessLocalCache {
    /// Load a fresh process-local cache from a completed analysis's
    /// high-frequency values. This is the single-writer step; once
    /// constructed, the cache is read-only.
    #[must_use]
    pub fn load(table_id: u64, column_id: u32, config: &Config, values: HashSet<u64>) -> Self {
        Self {
            table_id,
            column_id,
            kmer_size: config.kmer_size,
            occurrence_bits: config.occurrence_bits,
            max_appearance_rate: config.max_appearance_rate,
            max_appearance_rows: config.max_appearance_rows,
            values,
        }
    }

    /// Whether `value` is a known high-frequency k-mer for this
    /// table/column.
    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        self.values.contains(&value)
    }

    /// Number of distinct high-frequency values held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the cache holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Validate that this cache was built for the table/column a caller
    /// expects, against the live `(k, b, r, N)` configuration.
    ///
    /// # Errors
    ///
    /// Returns [`KmerError::CacheNotLoaded`] if the table/column don't
    /// match, or [`KmerError::CacheConfigMismatch`] if `kmer_size`,
    /// `occurrence_bits`, `max_appearance_rate`, or `max_appearance_rows`
    /// disagree with `config`.
    pub fn validate(&self, table_id: u64, column_id: u32, config: &Config) -> KmerResult<()> {
        if self.table_id != table_id || self.column_id != column_id {
            return Err(KmerError::CacheNotLoaded { table_id, column_id });
        }
        if self.kmer_size != config.kmer_size {
            return Err(KmerError::CacheConfigMismatch { field: "kmer_size" });
        }
        if self.occurrence_bits != config.occurrence_bits {
            return Err(KmerError::CacheConfigMismatch { field: "occurrence_bits" });
        }
        #[allow(clippy::float_cmp)]
        let rate_drifted = self.max_appearance_rate != config.max_appearance_rate;
        if rate_drifted {
            return Err(KmerError::CacheConfigMismatch { field: "max_appearance_rate" });
        }
        if self.max_appearance_rows != config.max_appearance_rows {
            return Err(KmerError::CacheConfigMismatch { field: "max_appearance_rows" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_kmer_size_drift() {
        let loaded_with = Config { kmer_size: 16, ..Config::default() };
        let cache = ProcessLocalCache::load(1, 1, &loaded_with, HashSet::new());
        let live = Config { kmer_size: 8, ..Config::default() };
        let err = cache.validate(1, 1, &live).unwrap_err();
        assert_eq!(err, KmerError::CacheConfigMismatch { field: "kmer_size" });
    }

    #[test]
    fn validate_rejects_max_appearance_rate_drift() {
        let loaded_with = Config { max_appearance_rate: 0.5, ..Config::default() };
        let cache = ProcessLocalCache::load(1, 1, &loaded_with, HashSet::new());
        let live = Config { max_appearance_rate: 0.1, ..Config::default() };
        let err = cache.validate(1, 1, &live).unwrap_err();
        assert_eq!(err, KmerError::CacheConfigMismatch { field: "max_appearance_rate" });
    }

    #[test]
    fn contains_reflects_loaded_values() {
        let config = Config { kmer_size: 16, ..Config::default() };
        let cache = ProcessLocalCache::load(1, 1, &config, HashSet::from([5, 9]));
        assert!(cache.contains(5));
        assert!(!cache.contains(7));
    }
}
