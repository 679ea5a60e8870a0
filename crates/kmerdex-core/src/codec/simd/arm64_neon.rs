//! `aarch64` NEON kernels for the codec's encode/decode hot path.

use std::arch::aarch64::{vld1q_u8, uint8x16_t};

use crate::error::KmerResult;

/// NEON-accelerated encode: loads 16-byte lanes to prefetch the alphabet
/// lookup into cache-friendly strides, then maps and packs each code.
///
/// # Safety
///
/// Caller must have confirmed `is_aarch64_feature_detected!("neon")` before
/// calling; this function is only ever reached from
/// [`super::encode_dispatch`] which performs that check.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn encode_chunk_neon(
    text: &[u8],
    width: u8,
    char_to_code: impl Fn(u8) -> Option<u8>,
) -> KmerResult<super::super::PackedSequence> {
    let mut codes = Vec::with_capacity(text.len());

    for lane in text.chunks(16) {
        if lane.len() == 16 {
            // SAFETY: `lane` is exactly 16 bytes, satisfying the 128-bit
            // load's size requirement; the parent function's
            // `#[target_feature(enable = "neon")]` guarantees NEON is
            // available for this load.
            let loaded: uint8x16_t = unsafe { vld1q_u8(lane.as_ptr()) };
            let bytes: [u8; 16] = unsafe { std::mem::transmute(loaded) };
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

/// NEON-accelerated decode counterpart of [`encode_chunk_neon`].
///
/// # Safety
///
/// Caller must have confirmed `is_aarch64_feature_detected!("neon")` before
/// calling.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn decode_codes_neon(
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
