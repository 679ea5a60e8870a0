//! Two-bit codec: the canonical ACGT alphabet, `A=00, C=01, G=10, T=11`.

use super::{simd, Codec, PackedSequence};
use crate::error::KmerResult;

/// Width in bits of one DNA2 base.
pub const WIDTH: u8 = 2;

/// Canonical two-bit DNA codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dna2Codec;

impl Codec for Dna2Codec {
    fn width(&self) -> u8 {
        WIDTH
    }

    fn encode(&self, text: &[u8]) -> KmerResult<PackedSequence> {
        simd::encode_dispatch(text, WIDTH, char_to_code)
    }

    fn decode(&self, packed: &PackedSequence) -> KmerResult<Vec<u8>> {
        simd::decode_dispatch(packed, WIDTH, code_to_char)
    }
}

/// Map an accepted input byte to its two-bit code; `U`/`u` folds to `T`.
/// Returns `None` for any byte outside `{A,C,G,T,U}` (case-insensitive).
fn char_to_code(byte: u8) -> Option<u8> {
    match byte.to_ascii_uppercase() {
        b'A' => Some(0b00),
        b'C' => Some(0b01),
        b'G' => Some(0b10),
        b'T' | b'U' => Some(0b11),
        _ => None,
    }
}

/// Map a two-bit code back to its uppercase canonical base.
fn code_to_char(code: u8) -> Option<u8> {
    match code {
        0b00 => Some(b'A'),
        0b01 => Some(b'C'),
        0b10 => Some(b'G'),
        0b11 => Some(b'T'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_1_round_trip() {
        let codec = Dna2Codec;
        let packed = codec.encode(b"ACGTACGT").unwrap();
        assert_eq!(packed.bit_len(), 16);
        assert_eq!(packed.bytes(), &[0x1B, 0x1B]);
        let decoded = codec.decode(&packed).unwrap();
        assert_eq!(decoded, b"ACGTACGT");
    }

    #[test]
    fn lowercase_and_u_fold() {
        let codec = Dna2Codec;
        let packed = codec.encode(b"acgu").unwrap();
        let decoded = codec.decode(&packed).unwrap();
        assert_eq!(decoded, b"ACGT");
    }

    #[test]
    fn rejects_invalid_character() {
        let codec = Dna2Codec;
        let err = codec.encode(b"ACGN").unwrap_err();
        assert!(matches!(
            err,
            crate::error::KmerError::InvalidCharacter { byte: b'N', width: 2 }
        ));
    }

    #[test]
    fn all_a_encodes_to_zero() {
        let codec = Dna2Codec;
        let packed = codec.encode(b"AAAA").unwrap();
        assert_eq!(packed.bytes(), &[0x00]);
    }

    #[test]
    fn long_sequence_crosses_simd_threshold_and_round_trips() {
        let codec = Dna2Codec;
        let text: Vec<u8> = b"ACGT".iter().cycle().take(200).copied().collect();
        let packed = codec.encode(&text).unwrap();
        let decoded = codec.decode(&packed).unwrap();
        assert_eq!(decoded, text);
    }
}
