//! Parallel high-frequency k-mer analyzer.
//!
//! Scans every row of a table column once, builds the set of distinct
//! k-mer values each row contains, and reports every value whose
//! distinct-row count clears the configured threshold. Downstream, the
//! query matcher and index adapter use this set to discount or exclude
//! k-mers that are too common to be informative (`preclude_highfreq`).
//!
//! The reference system runs this as a leader process that attaches a
//! dynamic shared memory segment and launches OS worker processes over it,
//! following a strict suspension-point sequence:
//! `EnterParallel -> CreateContext -> LaunchWorkers -> Wait -> DestroyContext
//! -> ExitParallel -> PerformSQLInserts -> ReleaseTableLock`. This engine
//! runs every worker as a task on a local `rayon` pool against a shared
//! [`dashmap::DashMap`] in place of real shared memory — see
//! [`crate::storage_contract::WorkerLauncher`] for why that substitution is
//! sound here — but [`leader::run_analysis`] keeps the same sequence of
//! steps, in the same order, as explicit method calls.

pub mod leader;
pub mod shared_hash;
pub mod worker;

pub use leader::{run_analysis, AnalysisDeps};

/// One row of the `highfreq_kmer` catalog table: a k-mer value that
/// appeared in at least `row_count` distinct rows of the analyzed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighFreqRecord {
    /// Table the analysis ran against.
    pub table_id: u64,
    /// Column within the table.
    pub column_id: u32,
    /// The k-mer's raw integer value (or, for `k > 32`, its packed-bytes
    /// hash).
    pub kmer_value: u64,
    /// Number of distinct rows this value was observed in.
    pub row_count: u64,
}

/// One row of the `highfreq_meta` catalog table: the parameters and
/// summary of a completed analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisMetadata {
    /// Table the analysis ran against.
    pub table_id: u64,
    /// Column within the table.
    pub column_id: u32,
    /// K-mer size used for this run.
    pub k: u32,
    /// Occurrence-bit-length used for this run.
    pub occurrence_bits: u32,
    /// Max-appearance-rate used for this run.
    pub max_appearance_rate: f64,
    /// Max-appearance-rows used for this run.
    pub max_appearance_rows: u64,
    /// Total rows scanned.
    pub total_rows: u64,
    /// The distinct-row-count threshold a value had to clear to be
    /// recorded: `max(N, ceil(r * total_rows))`.
    pub threshold: u64,
    /// Number of distinct k-mer values that cleared `threshold`.
    pub high_freq_count: u64,
    /// Unix timestamp (seconds) this run completed at.
    pub created_at: u64,
}
