//! Error taxonomy for the k-mer indexing engine.
//!
//! Every fallible operation in this crate returns one of the variants below.
//! Codec and extractor errors are local and surface to the caller unchanged;
//! analyzer worker errors are collected by the shared error slot (see
//! [`crate::analyzer::shared_hash`]) and re-raised by the leader once workers
//! have exited.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type KmerResult<T> = Result<T, KmerError>;

/// Errors produced by the codec, extractor, analyzer, and cache layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KmerError {
    /// Text input contained a byte outside the accepted alphabet for the
    /// chosen codec width.
    #[error("invalid character {byte:#04x} for {width}-bit alphabet")]
    InvalidCharacter {
        /// The offending input byte.
        byte: u8,
        /// The codec width (2 or 4) that rejected it.
        width: u8,
    },

    /// Decode received a bit length that is not a multiple of the codec
    /// width.
    #[error("bit length {len} is not a multiple of width {width}")]
    InvalidBitLength {
        /// The bit length that failed validation.
        len: usize,
        /// The codec width (2 or 4).
        width: u8,
    },

    /// A four-bit decode encountered the forbidden 0000 code.
    #[error("four-bit code 0000 is not a valid IUPAC base")]
    InvalidFourBitCode,

    /// `k` fell outside the supported range `[4, 64]`.
    #[error("k-mer size {0} is out of range [4, 64]")]
    InvalidKmerSize(u32),

    /// Occurrence-bit-length `b` fell outside `[0, 16]`.
    #[error("occurrence bit length {0} is out of range [0, 16]")]
    InvalidOccurrenceBitlen(u32),

    /// Query text was shorter than `k`.
    #[error("query of length {len} is shorter than k={k}")]
    QueryTooShort {
        /// Length of the supplied query text.
        len: usize,
        /// The configured k-mer size.
        k: u32,
    },

    /// Filter-on-index-build requested but no cache is populated for the
    /// given (table, column).
    #[error("no high-frequency cache loaded for table {table_id}, column {column_id}")]
    CacheNotLoaded {
        /// Identifier of the table the cache was requested for.
        table_id: u64,
        /// Identifier of the column the cache was requested for.
        column_id: u32,
    },

    /// Cache load refused because a configuration option disagrees with
    /// the stored analysis metadata.
    #[error("cache configuration mismatch on field `{field}`")]
    CacheConfigMismatch {
        /// Name of the mismatched configuration field.
        field: &'static str,
    },

    /// An analyzer worker recorded an error; propagated by the leader.
    #[error("analyzer worker error: {0}")]
    WorkerError(String),

    /// Reserving shared-memory capacity failed at context-setup time.
    #[error("failed to reserve shared memory capacity")]
    OutOfSharedMemory,

    /// Re-analysis was attempted without an explicit undo of a prior run.
    #[error("analysis already exists for table {table_id}, column {column_id}, k={k}")]
    AnalysisAlreadyExists {
        /// Identifier of the table already analyzed.
        table_id: u64,
        /// Identifier of the column already analyzed.
        column_id: u32,
        /// The k-mer size of the existing analysis.
        k: u32,
    },
}
