//! A single analyzer worker's scan of one batch of rows.

use tracing::{trace, warn};

use super::shared_hash::{ErrorSlot, SharedHash};
use crate::kmer::{Extractor, KmerArray};
use crate::monitoring::Metrics;
use crate::storage_contract::EncodedRow;

/// Scan one batch of rows, recording every row's distinct k-mer values into
/// `shared`. Exception-free: extraction failures are reported to
/// `errors` and the batch aborts early rather than unwinding, matching the
/// reference worker's "never let an error escape the worker" discipline.
pub fn scan_batch(extractor: &Extractor, rows: &[EncodedRow], shared: &SharedHash, errors: &ErrorSlot, metrics: &Metrics) {
    for row in rows {
        if errors.is_cancelled() {
            trace!("worker observed cancellation, abandoning remaining rows in batch");
            return;
        }
        metrics.analyzer_rows_scanned.inc();

        match extractor.extract_distinct_raw(&row.codes, row.width) {
            Ok(values) => record_values(&values, shared),
            Err(err) => {
                warn!(row_id = row.row_id, error = %err, "row extraction failed");
                errors.report(&format!("row {}: {err}", row.row_id));
                return;
            }
        }
    }
}

fn record_values(values: &KmerArray, shared: &SharedHash) {
    for value in values.as_u64_iter() {
        shared.record_row_occurrence(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::monitoring::Metrics;

    fn row(codes: Vec<u8>) -> EncodedRow {
        EncodedRow { row_id: 0, codes, width: 2 }
    }

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
    fn scan_batch_records_one_hit_per_row_per_value() {
        let config = Config::default();
        let extractor = Extractor::new(config.kmer_size, config.occurrence_bits).unwrap();
        let shared = SharedHash::create();
        let errors = ErrorSlot::new();
        let metrics = Metrics::new().unwrap();

        let rows = vec![row(dna2_codes(&b"A".repeat(32))), row(dna2_codes(&b"A".repeat(32)))];
        scan_batch(&extractor, &rows, &shared, &errors, &metrics);

        assert_eq!(shared.len(), 1);
        assert_eq!(shared.above_threshold(1).len(), 1);
        assert!(errors.take_message().is_none());
        assert_eq!(metrics.analyzer_rows_scanned.get(), 2);
    }

    #[test]
    fn scan_batch_stops_after_cancellation() {
        let config = Config::default();
        let extractor = Extractor::new(config.kmer_size, config.occurrence_bits).unwrap();
        let shared = SharedHash::create();
        let errors = ErrorSlot::new();
        errors.cancel();
        let metrics = Metrics::new().unwrap();

        let rows = vec![row(dna2_codes(&b"A".repeat(32)))];
        scan_batch(&extractor, &rows, &shared, &errors, &metrics);

        assert!(shared.is_empty());
        assert_eq!(metrics.analyzer_rows_scanned.get(), 0);
    }
}
