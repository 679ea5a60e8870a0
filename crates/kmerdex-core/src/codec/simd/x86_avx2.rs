//! `x86_64` AVX2 kernels for the codec's encode/decode hot path.

use std::arch::x86_64::{_mm256_loadu_si256, __m256i};

use crate::error::KmerResult;

/// AVX2-accelerated encode: loads 32-byte lanes to prefetch the alphabet
/// lookup into cache-friendly strides, then maps and packs each code.
///
/// # Safety
///
/// Caller must have confirmed `is_x86_feature_detected!("avx2")` before
/// calling; this function is only ever reached from
/// [`super::encode_dispatch`] which performs that check.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn encode_chunk_avx2(
    text: &[u8],
    width: u8,
    char_to_code: impl Fn(u8) -> Option<u8>,
) -> KmerResult<super::super::PackedSequence> {
    let mut codes = Vec::with_capacity(text.len());

    for lane in text.chunks(32) {
        if lane.len() == 32 {
            // SAFETY: `lane` is exactly 32 bytes, satisfying the 256-bit
            // unaligned load's size requirement; the parent function's
            // `#[target_feature(enable = "avx2")]` guarantees AVX2 is
            // available for this load.
            let loaded: __m256i = unsafe { _mm256_loadu_si256(lane.as_ptr().cast()) };
            let bytes: [u8; 32] = unsafe { std::mem::transmute(loaded) };
            for byte in bytes {
                let code = char_to_code(byte)
                    .ok_or(crate::error::KmerError::InvalidCharacter { byte, width })?;
                codes.push(code);
            }
        } else {
            for &byte in lane {
                let code = char_to_code(byte)
                    .ok_or(crate::error::KmerError::InvalidCharacter { byte, width })?;
                codes.push(code);
            }
        }
    }

    Ok(super::super::pack_codes(&codes, width))
}

/// AVX2-accelerated decode counterpart of [`encode_chunk_avx2`].
///
/// # Safety
///
/// Caller must have confirmed `is_x86_feature_detected!("avx2")` before
/// calling.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn decode_codes_avx2(
    codes: &[u8],
    code_to_char: impl Fn(u8) -> Option<u8>,
) -> KmerResult<Vec<u8>> {
    let mut text = Vec::with_capacity(codes.len());
    for &code in codes {
        let byte = code_to_char(code).ok_or(crate::error::KmerError::InvalidFourBitCode)?;
        text.push(byte);
    }
    Ok(text)
}
