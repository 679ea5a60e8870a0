//! Query k-mer extraction and exact-match scoring: `ExtractQueryKeys`,
//! `Score`, `EvaluateMatch`.

use std::collections::HashMap;

use tracing::{instrument, trace};

use crate::codec::dna4::Dna4Codec;
use crate::codec::{pack_codes, prefix_bits, unpack_codes, Codec, PackedSequence};
use crate::config::Config;
use crate::error::{KmerError, KmerResult};
use crate::kmer::Extractor;
use crate::monitoring::Metrics;

/// `ExtractQueryKeys(text, k) -> keys[]`: the unnumbered packed `2k`-bit
/// keys for every window of `text`, including duplicates. Degenerate
/// positions expand the same way they do for row extraction; a window whose
/// expansion would exceed the combinatorial bound contributes nothing.
///
/// # Errors
///
/// Returns [`KmerError::QueryTooShort`] if `text` is shorter than `k`.
#[instrument(skip(text), fields(k))]
pub fn extract_query_keys(text: &[u8], k: u32) -> KmerResult<Vec<PackedSequence>> {
    if text.len() < k as usize {
        return Err(KmerError::QueryTooShort { len: text.len(), k });
    }
    let extractor = Extractor::new(k, 0)?;
    let codec = Dna4Codec;
    let packed = codec.encode(text)?;
    let codes = unpack_codes(&packed, codec.width())?;
    let combos = extractor.window_codes(&codes, codec.width())?;

    let keys: Vec<PackedSequence> = combos.iter().map(|combo| pack_codes(combo, 2)).collect();
    trace!(emitted = keys.len(), "extracted query keys");
    Ok(keys)
}

/// `Score(row_keys, query_keys) -> SharedCount`: the multiset intersection
/// size between the row's occurrence-numbered keys (compared only on their
/// leading `2k` bits) and the query's unnumbered keys. A canonical k-mer
/// value appearing `m` times in the row and `n` times in the query
/// contributes `min(m, n)` to the total, so a repeated query window cannot
/// be credited more hits than the row actually has occurrences of, and vice
/// versa.
#[must_use]
pub fn score(row_keys: &[PackedSequence], query_keys: &[PackedSequence], k: u32) -> u64 {
    let prefix_len = 2 * k as usize;

    let mut row_counts: HashMap<Vec<u8>, u64> = HashMap::new();
    for key in row_keys {
        *row_counts.entry(prefix_bits(key, prefix_len)).or_insert(0) += 1;
    }

    let mut query_counts: HashMap<Vec<u8>, u64> = HashMap::new();
    for key in query_keys {
        *query_counts.entry(prefix_bits(key, prefix_len)).or_insert(0) += 1;
    }

    row_counts
        .iter()
        .filter_map(|(value, row_count)| query_counts.get(value).map(|query_count| (*row_count).min(*query_count)))
        .sum()
}

/// `EvaluateMatch(shared, query_total, s_min, r_min) -> bool`: a row matches
/// a query when it has at least `s_min` shared k-mers *and* the shared
/// fraction of the query's own k-mer count is at least `r_min`. A query
/// with zero extracted k-mers evaluates its rate as `0`, never dividing by
/// zero.
#[must_use]
pub fn evaluate_match(shared: u64, query_total: u64, s_min: u64, r_min: f64) -> bool {
    let rate = if query_total == 0 { 0.0 } else { shared as f64 / query_total as f64 };
    shared >= s_min && rate >= r_min
}

/// Operator-surface `raw_score`: encode a stored row and a query, extract
/// both key sets per `config`, and return their shared count. Reports one
/// [`Metrics::queries_scored`] and an observation of
/// [`Metrics::query_latency_seconds`] per successful call.
///
/// # Errors
///
/// Propagates codec and extraction errors, including
/// [`KmerError::QueryTooShort`].
pub fn raw_score(config: &Config, row_codes: &[u8], row_width: u8, query_text: &[u8], metrics: &Metrics) -> KmerResult<u64> {
    let start = std::time::Instant::now();
    let extractor = Extractor::new(config.kmer_size, config.occurrence_bits)?;
    let row_keys = extractor.extract_numbered(row_codes, row_width)?;
    let query_keys = extract_query_keys(query_text, config.kmer_size)?;
    let shared = score(&row_keys, &query_keys, config.kmer_size);

    metrics.queries_scored.inc();
    metrics.query_latency_seconds.observe(start.elapsed().as_secs_f64());
    Ok(shared)
}

/// Operator-surface `corrected_score`: currently an alias of
/// [`raw_score`] (see the design notes on score correction being an open
/// question left unresolved by this engine).
///
/// # Errors
///
/// Same as [`raw_score`].
pub fn corrected_score(
    config: &Config,
    row_codes: &[u8],
    row_width: u8,
    query_text: &[u8],
    metrics: &Metrics,
) -> KmerResult<u64> {
    raw_score(config, row_codes, row_width, query_text, metrics)
}

/// Operator-surface `match`: true when `raw_score` clears the configured
/// `min_score`/`min_shared_rate` thresholds.
///
/// # Errors
///
/// Same as [`raw_score`].
pub fn matches(config: &Config, row_codes: &[u8], row_width: u8, query_text: &[u8], metrics: &Metrics) -> KmerResult<bool> {
    let shared = raw_score(config, row_codes, row_width, query_text, metrics)?;
    let query_total = extract_query_keys(query_text, config.kmer_size)?.len() as u64;
    Ok(evaluate_match(shared, query_total, config.min_score, config.min_shared_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn scenario_6_query_too_short_errors() {
        let err = extract_query_keys(b"ACGT", 8).unwrap_err();
        assert_eq!(err, KmerError::QueryTooShort { len: 4, k: 8 });
    }

    #[test]
    fn scenario_5_shared_score_and_match() {
        let k = 4;
        let extractor = Extractor::new(k, 8).unwrap();
        let row_codes = dna2_codes(b"ACGTACGTACGT");
        let row_keys = extractor.extract_numbered(&row_codes, 2).unwrap();

        let query_keys = extract_query_keys(b"ACGTACGT", k).unwrap();
        assert_eq!(query_keys.len(), 5);

        let shared = score(&row_keys, &query_keys, k);
        assert_eq!(shared, 5);

        assert!(evaluate_match(shared, query_keys.len() as u64, 3, 0.5));
    }

    #[test]
    fn zero_query_keys_never_divides_by_zero() {
        assert!(!evaluate_match(0, 0, 1, 0.5));
    }

    #[test]
    fn disjoint_keys_score_zero() {
        let k = 4;
        let extractor = Extractor::new(k, 8).unwrap();
        let row_keys = extractor.extract_numbered(&dna2_codes(b"AAAAAAA"), 2).unwrap();
        let query_keys = extract_query_keys(b"CCCCCCC", k).unwrap();
        assert_eq!(score(&row_keys, &query_keys, k), 0);
    }
}
