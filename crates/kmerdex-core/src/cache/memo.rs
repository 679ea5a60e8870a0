//! LRU-bounded memoization of the two things worth not recomputing on every
//! query: a query text's extracted k-mer set, and a (row, query) pair's
//! computed score.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::codec::PackedSequence;

/// Default capacity for both memo tables when none is specified.
pub const DEFAULT_CAPACITY: usize = 4_096;

/// Memoizes `ExtractQueryKeys` results by `(query text, k)`.
#[derive(Debug)]
pub struct QueryKeyMemo {
    cache: Mutex<LruCache<(Vec<u8>, u32), Vec<PackedSequence>>>,
}

impl QueryKeyMemo {
    /// Create a memo table holding up to `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    /// Fetch a cached extraction, or compute and insert it via `compute`.
    pub fn get_or_insert_with(&self, query: &[u8], k: u32, compute: impl FnOnce() -> Vec<PackedSequence>) -> Vec<PackedSequence> {
        let key = (query.to_vec(), k);
        #[allow(clippy::unwrap_used)]
        let mut cache = self.cache.lock().unwrap();
        if let Some(hit) = cache.get(&key) {
            return hit.clone();
        }
        let computed = compute();
        cache.put(key, computed.clone());
        computed
    }
}

impl Default for QueryKeyMemo {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Memoizes a `(row identity, query text)` pair's computed shared-count
/// score.
#[derive(Debug)]
pub struct ScoreMemo {
    cache: Mutex<LruCache<(u64, Vec<u8>), u64>>,
}

impl ScoreMemo {
    /// Create a memo table holding up to `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    /// Fetch a cached score, or compute and insert it via `compute`.
    pub fn get_or_insert_with(&self, row_id: u64, query: &[u8], compute: impl FnOnce() -> u64) -> u64 {
        let key = (row_id, query.to_vec());
        #[allow(clippy::unwrap_used)]
        let mut cache = self.cache.lock().unwrap();
        if let Some(&hit) = cache.get(&key) {
            return hit;
        }
        let computed = compute();
        cache.put(key, computed);
        computed
    }
}

impl Default for ScoreMemo {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_key_memo_computes_once() {
        let memo = QueryKeyMemo::default();
        let mut calls = 0;
        let first = memo.get_or_insert_with(b"ACGT", 4, || {
            calls += 1;
            Vec::new()
        });
        let second = memo.get_or_insert_with(b"ACGT", 4, || {
            calls += 1;
            Vec::new()
        });
        assert_eq!(calls, 1);
        assert_eq!(first, second);
    }

    #[test]
    fn score_memo_computes_once_per_key() {
        let memo = ScoreMemo::default();
        let mut calls = 0;
        let first = memo.get_or_insert_with(1, b"ACGT", || {
            calls += 1;
            5
        });
        let second = memo.get_or_insert_with(1, b"ACGT", || {
            calls += 1;
            9
        });
        assert_eq!(calls, 1);
        assert_eq!(first, second);
        assert_eq!(first, 5);
    }
}
