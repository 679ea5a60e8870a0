//! Catalog-table shapes the analyzer and index adapter persist to and read
//! from, and the trait the host's SQL layer implements over its real
//! `highfreq_kmer` / `highfreq_meta` / `gin_index_meta` tables.

use crate::analyzer::{AnalysisMetadata, HighFreqRecord};
use crate::error::KmerResult;

/// One row of `gin_index_meta`: the configuration an index was built with,
/// checked against the live [`crate::config::Config`] on every cache load
/// (`CacheConfigMismatch` on drift).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GinIndexMeta {
    /// Identifier of this index row; the table's primary key.
    pub index_id: u64,
    /// Table the index covers.
    pub table_id: u64,
    /// Column within the table.
    pub column_id: u32,
    /// Whether high-frequency k-mers were excluded at index-build time.
    pub highfreq_filtered: bool,
    /// The heap table this index was built over.
    pub source_table: u64,
    /// K-mer size the index was built with.
    pub kmer_size: u32,
    /// Occurrence-bit-length the index was built with.
    pub occurrence_bits: u32,
    /// Max-appearance-rate the index was built with.
    pub max_appearance_rate: f64,
    /// Max-appearance-rows the index was built with.
    pub max_appearance_rows: u64,
    /// Unix timestamp (seconds) the index was created at.
    pub created_at: u64,
}

/// Persists and retrieves the catalog rows an analysis run produces and
/// depends on. Implemented by the host's SQL layer in the reference
/// system; this crate only calls through the trait.
pub trait AnalysisCatalog {
    /// Whether an analysis already exists for this table/column/k.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    fn has_analysis(&self, table_id: u64, column_id: u32, k: u32) -> KmerResult<bool>;

    /// Persist one completed run's metadata row and its high-frequency
    /// records (`PerformSQLInserts`).
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn insert_analysis(&self, meta: &AnalysisMetadata, records: &[HighFreqRecord]) -> KmerResult<()>;

    /// Look up the `gin_index_meta` row for a table/column, if an index
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    fn index_meta(&self, table_id: u64, column_id: u32) -> KmerResult<Option<GinIndexMeta>>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use super::{AnalysisCatalog, AnalysisMetadata, GinIndexMeta, HighFreqRecord, KmerResult};

    /// An in-memory catalog for tests.
    #[derive(Debug, Default)]
    pub struct MemoryCatalog {
        analyses: Mutex<Vec<(u64, u32, u32)>>,
        index_metas: Mutex<Vec<GinIndexMeta>>,
    }

    impl AnalysisCatalog for MemoryCatalog {
        fn has_analysis(&self, table_id: u64, column_id: u32, k: u32) -> KmerResult<bool> {
            #[allow(clippy::unwrap_used)]
            Ok(self.analyses.lock().unwrap().iter().any(|&(t, c, kk)| t == table_id && c == column_id && kk == k))
        }

        fn insert_analysis(&self, meta: &AnalysisMetadata, _records: &[HighFreqRecord]) -> KmerResult<()> {
            #[allow(clippy::unwrap_used)]
            self.analyses.lock().unwrap().push((meta.table_id, meta.column_id, meta.k));
            Ok(())
        }

        fn index_meta(&self, table_id: u64, column_id: u32) -> KmerResult<Option<GinIndexMeta>> {
            #[allow(clippy::unwrap_used)]
            Ok(self.index_metas.lock().unwrap().iter().find(|m| m.table_id == table_id && m.column_id == column_id).copied())
        }
    }
}
