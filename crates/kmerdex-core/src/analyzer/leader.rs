//! The analyzer's leader: orchestrates one full analysis run.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, instrument};

use super::shared_hash::{ErrorSlot, SharedHash};
use super::worker::scan_batch;
use super::{AnalysisMetadata, HighFreqRecord};
use crate::catalog::AnalysisCatalog;
use crate::config::Config;
use crate::error::{KmerError, KmerResult};
use crate::kmer::Extractor;
use crate::monitoring::Metrics;
use crate::storage_contract::{BlockReader, TableLock, WorkerLauncher};

/// The collaborators one analysis run needs beyond its own configuration:
/// the catalog it reads and writes, the table lock it acquires, the row
/// reader it scans, the launcher that parallelizes the scan, and the
/// metrics it reports to. Bundled into one struct so `run_analysis` takes a
/// handful of arguments rather than one per collaborator.
pub struct AnalysisDeps<'a> {
    /// Catalog used to check for and persist the analysis.
    pub catalog: &'a dyn AnalysisCatalog,
    /// Table-level lock held for the duration of the run.
    pub lock: &'a dyn TableLock,
    /// Row reader the workers scan through.
    pub reader: &'a dyn BlockReader,
    /// Launches the per-batch workers and waits for them to finish.
    pub launcher: &'a dyn WorkerLauncher,
    /// Metrics this run reports rows-scanned and completion counts to.
    pub metrics: &'a Metrics,
}

impl std::fmt::Debug for AnalysisDeps<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisDeps").finish_non_exhaustive()
    }
}

/// Run a complete high-frequency analysis over one table/column, following
/// the suspension-point sequence `EnterParallel -> CreateContext ->
/// LaunchWorkers -> Wait -> DestroyContext -> ExitParallel ->
/// PerformSQLInserts -> ReleaseTableLock`.
///
/// # Errors
///
/// Returns [`KmerError::AnalysisAlreadyExists`] if a run already exists for
/// this table/column/k. Propagates storage, extraction, and catalog
/// errors, including any error a worker reported through the shared error
/// slot.
#[instrument(skip(config, deps), fields(table_id, column_id, k = config.kmer_size))]
pub fn run_analysis(
    config: &Config,
    table_id: u64,
    column_id: u32,
    deps: &AnalysisDeps<'_>,
) -> KmerResult<(AnalysisMetadata, Vec<HighFreqRecord>)> {
    if deps.catalog.has_analysis(table_id, column_id, config.kmer_size)? {
        return Err(KmerError::AnalysisAlreadyExists { table_id, column_id, k: config.kmer_size });
    }

    // EnterParallel
    deps.lock.acquire(table_id)?;
    let result = run_locked(config, table_id, column_id, deps);
    // ReleaseTableLock, regardless of outcome.
    deps.lock.release(table_id);

    match &result {
        Ok(_) => deps.metrics.analyzer_runs_completed.inc(),
        Err(_) => deps.metrics.analyzer_runs_failed.inc(),
    }
    result
}

fn run_locked(
    config: &Config,
    table_id: u64,
    column_id: u32,
    deps: &AnalysisDeps<'_>,
) -> KmerResult<(AnalysisMetadata, Vec<HighFreqRecord>)> {
    let total_rows = deps.reader.row_count(table_id, column_id)?;
    let threshold = config.highfreq_threshold(total_rows);
    let extractor = Extractor::new(config.kmer_size, config.occurrence_bits)?;

    // CreateContext
    let shared = SharedHash::create();
    let errors = ErrorSlot::new();

    let batch_count = total_rows.div_ceil(u64::from(config.analysis_batch_size));
    let offsets: Vec<u64> = (0..batch_count).map(|i| i * u64::from(config.analysis_batch_size)).collect();

    // LaunchWorkers -> Wait
    deps.launcher.launch_and_wait(offsets, |offset| {
        if errors.is_cancelled() {
            return;
        }
        match deps.reader.read_batch(table_id, column_id, offset, config.analysis_batch_size) {
            Ok(rows) => scan_batch(&extractor, &rows, &shared, &errors, deps.metrics),
            Err(err) => errors.report(&format!("read_batch at offset {offset}: {err}")),
        }
    });

    if let Some(message) = errors.take_message() {
        return Err(KmerError::WorkerError(message));
    }

    let records: Vec<HighFreqRecord> = shared
        .above_threshold(threshold)
        .into_iter()
        .map(|(kmer_value, row_count)| HighFreqRecord { table_id, column_id, kmer_value, row_count })
        .collect();

    // DestroyContext -> ExitParallel
    shared.destroy();

    let meta = AnalysisMetadata {
        table_id,
        column_id,
        k: config.kmer_size,
        occurrence_bits: config.occurrence_bits,
        max_appearance_rate: config.max_appearance_rate,
        max_appearance_rows: config.max_appearance_rows,
        total_rows,
        threshold,
        high_freq_count: records.len() as u64,
        created_at: now_unix_secs(),
    };

    // PerformSQLInserts
    deps.catalog.insert_analysis(&meta, &records)?;
    info!(total_rows, threshold, high_freq_count = meta.high_freq_count, "analysis complete");

    Ok((meta, records))
}

fn now_unix_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::MemoryCatalog;
    use crate::storage_contract::test_support::{MemoryBlockReader, MemoryTableLock};
    use crate::storage_contract::{EncodedRow, RayonLauncher};

    fn dna2_codes(text: &[u8]) -> Vec<u8> {
        text.iter()
            .map(|&b| match b {
                b'A' => 0b00,
                b'C' => 0b01,
                b'G' => 0b10,
                b'T' => 0b11,
                _ => panic!("non-canonical test input"),
            })
            .collect()
    }

    #[test]
    fn scenario_4_thousand_rows_threshold_fifty() {
        let config = Config {
            kmer_size: 4,
            max_appearance_rate: 0.05,
            max_appearance_rows: 0,
            analysis_batch_size: 1_000,
            ..Config::default()
        };
        let rows: Vec<EncodedRow> =
            (0..1000).map(|i| EncodedRow { row_id: i, codes: dna2_codes(b"AAAA"), width: 2 }).collect();

        let catalog = MemoryCatalog::default();
        let lock = MemoryTableLock::default();
        let reader = MemoryBlockReader { rows };
        let launcher = RayonLauncher;
        let metrics = Metrics::new().unwrap();
        let deps = AnalysisDeps { catalog: &catalog, lock: &lock, reader: &reader, launcher: &launcher, metrics: &metrics };

        let (meta, records) = run_analysis(&config, 1, 1, &deps).unwrap();

        assert_eq!(meta.total_rows, 1000);
        assert_eq!(meta.threshold, 50);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kmer_value, 0);
        assert_eq!(records[0].row_count, 1000);
    }

    #[test]
    fn rejects_duplicate_analysis() {
        let config = Config { kmer_size: 4, ..Config::default() };
        let catalog = MemoryCatalog::default();
        catalog.insert_analysis(
            &AnalysisMetadata {
                table_id: 1,
                column_id: 1,
                k: 4,
                occurrence_bits: config.occurrence_bits,
                max_appearance_rate: config.max_appearance_rate,
                max_appearance_rows: config.max_appearance_rows,
                total_rows: 0,
                threshold: 0,
                high_freq_count: 0,
                created_at: 0,
            },
            &[],
        )
        .unwrap();

        let lock = MemoryTableLock::default();
        let reader = MemoryBlockReader::default();
        let launcher = RayonLauncher;
        let metrics = Metrics::new().unwrap();
        let deps = AnalysisDeps { catalog: &catalog, lock: &lock, reader: &reader, launcher: &launcher, metrics: &metrics };

        let err = run_analysis(&config, 1, 1, &deps).unwrap_err();
        assert_eq!(err, KmerError::AnalysisAlreadyExists { table_id: 1, column_id: 1, k: 4 });
    }
}
