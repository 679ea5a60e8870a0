//! Sliding-window k-mer extraction: `Extract(seq, k, b) -> keys[]`.

use hashbrown::{HashMap, HashSet};
use tracing::{instrument, trace};

use super::degenerate;
use super::{kmer_hash64, kmer_value_u64, wrap_many, KmerArray};
use crate::codec::{append_suffix_bits, pack_codes, PackedSequence};
use crate::config::{MAX_KMER_SIZE, MAX_OCCURRENCE_BITS, MIN_KMER_SIZE};
use crate::error::{KmerError, KmerResult};

/// Extracts k-mer keys from an encoded sequence's unpacked base codes.
///
/// A fresh `Extractor` is cheap to construct; the per-row occurrence table
/// used internally is scoped to a single call and released on return, per
/// the per-row dedup-set discipline described for the analyzer.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    k: u32,
    b: u32,
}

impl Extractor {
    /// Construct an extractor for k-mer size `k` and occurrence-bit-length
    /// `b`.
    ///
    /// # Errors
    ///
    /// Returns [`KmerError::InvalidKmerSize`] or
    /// [`KmerError::InvalidOccurrenceBitlen`] if either is out of range.
    pub fn new(k: u32, b: u32) -> KmerResult<Self> {
        if !(MIN_KMER_SIZE..=MAX_KMER_SIZE).contains(&k) {
            return Err(KmerError::InvalidKmerSize(k));
        }
        if b > MAX_OCCURRENCE_BITS {
            return Err(KmerError::InvalidOccurrenceBitlen(b));
        }
        Ok(Self { k, b })
    }

    /// Configured k-mer size.
    #[must_use]
    pub const fn k(&self) -> u32 {
        self.k
    }

    /// Configured occurrence-bit-length.
    #[must_use]
    pub const fn b(&self) -> u32 {
        self.b
    }

    /// Maximum occurrence count before a key is dropped: `2^b`.
    #[must_use]
    pub const fn max_occurrence(&self) -> u64 {
        1u64 << self.b
    }

    /// Slide a `k`-wide window over `codes` and, for `width == 4`, expand
    /// degenerate positions per [`degenerate::expand_window`]. Returns the
    /// concrete canonical (two-bit) code arrays in window-then-expansion
    /// order; a skipped degenerate window contributes nothing.
    pub(crate) fn window_codes(&self, codes: &[u8], width: u8) -> KmerResult<Vec<Vec<u8>>> {
        let k = self.k as usize;
        if codes.len() < k {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for start in 0..=(codes.len() - k) {
            let window = &codes[start..start + k];
            match width {
                2 => out.push(window.to_vec()),
                4 => {
                    if let Some(combos) = degenerate::expand_window(window)? {
                        out.extend(combos);
                    }
                }
                other => return Err(KmerError::InvalidBitLength { len: usize::from(other), width: other }),
            }
        }
        Ok(out)
    }

    /// `Extract(seq, k, b) -> keys[]`: produce the numbered packed-bit-string
    /// keys (length `2k + b`) that represent one row in the inverted index.
    ///
    /// Occurrence numbers are assigned 1, 2, 3, … in window-emission order
    /// per distinct canonical k-mer value; numbers exceeding `2^b` are
    /// dropped (this spec's resolution of the saturate-vs-drop open
    /// question — see the design notes).
    #[instrument(skip(self, codes), fields(k = self.k, b = self.b))]
    pub fn extract_numbered(&self, codes: &[u8], width: u8) -> KmerResult<Vec<PackedSequence>> {
        let combos = self.window_codes(codes, width)?;
        let mut occurrences: HashMap<Vec<u8>, u64> = HashMap::new();
        let mut keys = Vec::with_capacity(combos.len());

        for combo in combos {
            let canonical = pack_codes(&combo, 2);
            let count = occurrences.entry(canonical.bytes().to_vec()).or_insert(0);
            *count += 1;
            if *count > self.max_occurrence() {
                continue;
            }
            let adj = *count - 1;
            keys.push(append_suffix_bits(&canonical, adj, u8::try_from(self.b).unwrap_or(u8::MAX)));
        }

        trace!(emitted = keys.len(), "extracted numbered keys");
        Ok(keys)
    }

    /// Extract the set of distinct raw k-mer values appearing in a row, for
    /// the analyzer's per-row deduplicated shared-hash increment. Unlike
    /// [`extract_numbered`](Self::extract_numbered), occurrence numbers and
    /// the `2^b` drop rule do not apply here: the analyzer counts
    /// appearance, not multiplicity.
    #[instrument(skip(self, codes), fields(k = self.k))]
    pub fn extract_distinct_raw(&self, codes: &[u8], width: u8) -> KmerResult<KmerArray> {
        let combos = self.window_codes(codes, width)?;
        let mut seen: HashSet<u64> = HashSet::new();

        for combo in combos {
            let value = if self.k <= 32 {
                kmer_value_u64(&combo)
            } else {
                kmer_hash64(&pack_codes(&combo, 2))
            };
            seen.insert(value);
        }

        let mut values: Vec<u64> = seen.into_iter().collect();
        values.sort_unstable();
        Ok(wrap_many(self.k, values))
    }
}
