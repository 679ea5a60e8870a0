//! Glue between the codec/extractor and the external inverted-index
//! machinery: `KeysForValue`, `KeysForQuery`, `IsConsistent`.

use crate::cache::ProcessLocalCache;
use crate::codec::{canonical_prefix_codes, pack_codes, PackedSequence};
use crate::error::KmerResult;
use crate::kmer::{kmer_hash64, kmer_value_u64, Extractor};
use crate::query::extract_query_keys;

/// The three-valued outcome of the index's `consistent` support function.
/// `Yes` is part of the operator-class contract but this adapter's
/// algorithm never emits it directly: proving a match requires the full
/// shared-count/rate rescore from §4.3, so every candidate the bitmap
/// doesn't already rule out comes back as `Recheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    /// The index alone proves a match; no rescore needed.
    Yes,
    /// The index alone proves a non-match; the candidate is discarded.
    No,
    /// The index cannot decide; the caller must rescore the row directly.
    Recheck,
}

/// `KeysForValue(row_value) -> keys[]`: extract a row's numbered index
/// keys, then drop any key whose canonical prefix is a known
/// high-frequency value, if `cache` is `Some`.
///
/// # Errors
///
/// Propagates extraction errors from [`Extractor::extract_numbered`].
pub fn keys_for_value(
    extractor: &Extractor,
    codes: &[u8],
    width: u8,
    cache: Option<&ProcessLocalCache>,
) -> KmerResult<Vec<PackedSequence>> {
    let keys = extractor.extract_numbered(codes, width)?;
    let Some(cache) = cache else {
        return Ok(keys);
    };

    let k = extractor.k();
    Ok(keys
        .into_iter()
        .filter(|key| {
            let prefix_codes = canonical_prefix_codes(key, k);
            let value =
                if k <= 32 { kmer_value_u64(&prefix_codes) } else { kmer_hash64(&pack_codes(&prefix_codes, 2)) };
            !cache.contains(value)
        })
        .collect())
}

/// `KeysForQuery(query_text) -> keys[]`: extract a query's unnumbered index
/// keys.
///
/// # Errors
///
/// Propagates [`crate::error::KmerError::QueryTooShort`] and extraction
/// errors.
pub fn keys_for_query(query_text: &[u8], k: u32) -> KmerResult<Vec<PackedSequence>> {
    extract_query_keys(query_text, k)
}

/// `IsConsistent(bitmap_of_query_key_presence, query_keys) -> {Yes, No,
/// Recheck}`: count the set bits, adjust `s_min` down by the number of the
/// query's own keys that were excluded from indexing (`excluded_in_query`,
/// so a true match can never be missed just because high-frequency
/// filtering hid it from every row's index), and recommend a rescore
/// whenever the adjusted threshold could still be met.
#[must_use]
pub fn is_consistent(bitmap: &[bool], s_min: u64, excluded_in_query: u64) -> Consistency {
    let count = bitmap.iter().filter(|&&present| present).count() as u64;
    let s_adj = s_min.saturating_sub(excluded_in_query);
    if count >= s_adj {
        Consistency::Recheck
    } else {
        Consistency::No
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistent_recommends_recheck_when_count_meets_adjusted_threshold() {
        assert_eq!(is_consistent(&[true, true, false], 2, 0), Consistency::Recheck);
    }

    #[test]
    fn consistent_rejects_when_below_adjusted_threshold() {
        assert_eq!(is_consistent(&[true, false, false], 3, 0), Consistency::No);
    }

    #[test]
    fn excluded_query_keys_lower_the_threshold() {
        // s_min=3, but one of the query's keys was never indexed, so the
        // effective threshold drops to 2 and a 2-bit count must recheck.
        assert_eq!(is_consistent(&[true, true, false], 3, 1), Consistency::Recheck);
    }

    #[test]
    fn keys_for_value_passes_through_without_a_cache() {
        let extractor = Extractor::new(4, 8).unwrap();
        let codes = vec![0b00u8, 0b01, 0b10, 0b11];
        let keys = keys_for_value(&extractor, &codes, 2, None).unwrap();
        assert_eq!(keys.len(), 1);
    }
}
