//! # kmerdex-core
//!
//! A k-mer inverted-index engine for DNA sequence similarity search:
//! bit-packed codecs for the canonical and IUPAC-degenerate alphabets,
//! sliding-window k-mer extraction with occurrence numbering, a parallel
//! high-frequency k-mer analyzer, a multi-tier result cache, and the query
//! scorer/matcher that sits in front of an inverted index.
//!
//! Storage, the SQL planner, the GIN index proper, and the GUC registry are
//! host responsibilities this crate only speaks to through the traits in
//! [`storage_contract`] and [`catalog`].

pub mod analyzer;
pub mod cache;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod index_adapter;
pub mod kmer;
pub mod monitoring;
pub mod query;
pub mod storage_contract;

pub use codec::dna2::Dna2Codec;
pub use codec::dna4::Dna4Codec;
pub use codec::{Codec, PackedSequence};
pub use config::{Config, ConfigBuilder};
pub use error::{KmerError, KmerResult};
pub use kmer::{Extractor, KmerArray};
