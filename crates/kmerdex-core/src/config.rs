//! Runtime configuration surface.
//!
//! The reference implementation reads these as process-global configuration
//! variables; here they are collected into an immutable [`Config`] handed
//! explicitly to the extractor, analyzer, and cache. Mutation only happens
//! at construction time via [`ConfigBuilder`].

use serde::{Deserialize, Serialize};

use crate::error::{KmerError, KmerResult};

/// Minimum supported k-mer size.
pub const MIN_KMER_SIZE: u32 = 4;
/// Maximum supported k-mer size.
pub const MAX_KMER_SIZE: u32 = 64;
/// Maximum supported occurrence-bit-length.
pub const MAX_OCCURRENCE_BITS: u32 = 16;
/// Minimum analysis batch size, in rows per work unit.
pub const MIN_ANALYSIS_BATCH_SIZE: u32 = 1_000;
/// Maximum analysis batch size, in rows per work unit.
pub const MAX_ANALYSIS_BATCH_SIZE: u32 = 1_000_000;

/// Immutable configuration shared by the extractor, analyzer, and cache.
///
/// See §6 of the design for the full option table; field names below are
/// the snake_case equivalent of the conceptual option names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `k` for extraction and indexing. Range `[4, 64]`, default 16.
    pub kmer_size: u32,
    /// `b`, bits of occurrence suffix. Range `[0, 16]`, default 8.
    pub occurrence_bits: u32,
    /// `r` for high-frequency detection. Range `[0, 1]`, default 0.5.
    pub max_appearance_rate: f64,
    /// `N` for high-frequency detection; 0 disables. Default 0.
    pub max_appearance_rows: u64,
    /// `s_min` for the match predicate. Default 1.
    pub min_score: u64,
    /// `r_min` for the match predicate. Range `[0, 1]`, default 0.9.
    pub min_shared_rate: f64,
    /// Enable indexing-time filtering via the high-frequency cache.
    pub preclude_highfreq: bool,
    /// Rows per work unit (storage-block granularity). Range
    /// `[1000, 1_000_000]`, default 10000.
    pub analysis_batch_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kmer_size: 16,
            occurrence_bits: 8,
            max_appearance_rate: 0.5,
            max_appearance_rows: 0,
            min_score: 1,
            min_shared_rate: 0.9,
            preclude_highfreq: false,
            analysis_batch_size: 10_000,
        }
    }
}

impl Config {
    /// Re-validate the current field values.
    ///
    /// # Errors
    ///
    /// Returns [`KmerError::InvalidKmerSize`] or
    /// [`KmerError::InvalidOccurrenceBitlen`] if those two fields are out of
    /// range; other out-of-range fields are clamped-on-construction values
    /// that the caller is expected to have validated upstream (configuration
    /// parsing), so this only re-checks the two fields the extractor itself
    /// depends on for correctness.
    pub fn validate(&self) -> KmerResult<()> {
        if !(MIN_KMER_SIZE..=MAX_KMER_SIZE).contains(&self.kmer_size) {
            return Err(KmerError::InvalidKmerSize(self.kmer_size));
        }
        if self.occurrence_bits > MAX_OCCURRENCE_BITS {
            return Err(KmerError::InvalidOccurrenceBitlen(self.occurrence_bits));
        }
        Ok(())
    }

    /// Maximum occurrence count before keys are dropped: `2^b`.
    #[must_use]
    pub const fn max_occurrence(&self) -> u64 {
        1u64 << self.occurrence_bits
    }

    /// High-frequency threshold given a total row count: `max(N, ceil(r *
    /// total_rows))`.
    #[must_use]
    pub fn highfreq_threshold(&self, total_rows: u64) -> u64 {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rate_threshold = (self.max_appearance_rate * total_rows as f64).ceil() as u64;
        self.max_appearance_rows.max(rate_threshold)
    }
}

/// Fluent, validated builder for [`Config`]. Each setter takes one field so
/// a caller only names the options it wants to override, defaulting every
/// other field from [`Config::default`]; [`ConfigBuilder::build`] then
/// re-validates the assembled configuration in one place rather than
/// requiring a wide positional constructor.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from [`Config::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `k`.
    #[must_use]
    pub fn kmer_size(mut self, kmer_size: u32) -> Self {
        self.config.kmer_size = kmer_size;
        self
    }

    /// Set `b`, the occurrence-suffix bit length.
    #[must_use]
    pub fn occurrence_bits(mut self, occurrence_bits: u32) -> Self {
        self.config.occurrence_bits = occurrence_bits;
        self
    }

    /// Set `r`, the high-frequency appearance-rate threshold.
    #[must_use]
    pub fn max_appearance_rate(mut self, max_appearance_rate: f64) -> Self {
        self.config.max_appearance_rate = max_appearance_rate;
        self
    }

    /// Set `N`, the high-frequency appearance-row-count threshold.
    #[must_use]
    pub fn max_appearance_rows(mut self, max_appearance_rows: u64) -> Self {
        self.config.max_appearance_rows = max_appearance_rows;
        self
    }

    /// Set `s_min`, the match predicate's minimum shared count.
    #[must_use]
    pub fn min_score(mut self, min_score: u64) -> Self {
        self.config.min_score = min_score;
        self
    }

    /// Set `r_min`, the match predicate's minimum shared rate.
    #[must_use]
    pub fn min_shared_rate(mut self, min_shared_rate: f64) -> Self {
        self.config.min_shared_rate = min_shared_rate;
        self
    }

    /// Set whether indexing-time filtering via the high-frequency cache is
    /// enabled.
    #[must_use]
    pub fn preclude_highfreq(mut self, preclude_highfreq: bool) -> Self {
        self.config.preclude_highfreq = preclude_highfreq;
        self
    }

    /// Set the analyzer's rows-per-work-unit batch size.
    #[must_use]
    pub fn analysis_batch_size(mut self, analysis_batch_size: u32) -> Self {
        self.config.analysis_batch_size = analysis_batch_size;
        self
    }

    /// Validate and produce the assembled [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`KmerError::InvalidKmerSize`] or
    /// [`KmerError::InvalidOccurrenceBitlen`] if those fields are out of
    /// range; see [`Config::validate`].
    pub fn build(self) -> KmerResult<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_kmer_size_out_of_range() {
        let err = ConfigBuilder::new().kmer_size(3).build().unwrap_err();
        assert_eq!(err, KmerError::InvalidKmerSize(3));
    }

    #[test]
    fn rejects_occurrence_bits_out_of_range() {
        let err = ConfigBuilder::new().occurrence_bits(17).build().unwrap_err();
        assert_eq!(err, KmerError::InvalidOccurrenceBitlen(17));
    }

    #[test]
    fn builder_overrides_only_named_fields() {
        let config = ConfigBuilder::new().kmer_size(24).min_score(5).build().unwrap();
        assert_eq!(config.kmer_size, 24);
        assert_eq!(config.min_score, 5);
        assert_eq!(config.occurrence_bits, Config::default().occurrence_bits);
    }

    #[test]
    fn threshold_matches_scenario_4() {
        let config = Config::default();
        assert_eq!(config.highfreq_threshold(1000), 50.max(0));
        let config = Config {
            max_appearance_rate: 0.05,
            max_appearance_rows: 0,
            ..config
        };
        assert_eq!(config.highfreq_threshold(1000), 50);
    }

    #[test]
    fn max_occurrence_matches_b() {
        let config = Config {
            occurrence_bits: 2,
            ..Config::default()
        };
        assert_eq!(config.max_occurrence(), 4);
    }
}
