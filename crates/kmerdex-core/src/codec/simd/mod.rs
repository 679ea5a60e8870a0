//! Runtime-dispatched SIMD kernels for the codec's encode/decode hot path.
//!
//! At process init nothing is installed ahead of time; instead each call
//! detects CPU capability once per [`PackedSequence`](super::PackedSequence)
//! operation and picks the widest supported kernel, falling back to scalar
//! below [`DISPATCH_THRESHOLD`] bases (SIMD setup cost dominates for short
//! strings) or when no wider kernel is available.

#[cfg(target_arch = "x86_64")]
pub mod x86_avx2;

#[cfg(target_arch = "aarch64")]
pub mod arm64_neon;

/// Minimum base count before a SIMD kernel is considered; below this the
/// scalar path is used unconditionally.
pub const DISPATCH_THRESHOLD: usize = 64;

/// CPU SIMD capabilities detected at call time.
#[derive(Debug, Clone, Copy)]
pub struct SimdCapabilities {
    /// AVX2 available (`x86_64` only).
    pub has_avx2: bool,
    /// NEON available (`aarch64` only).
    pub has_neon: bool,
    /// Bytes processed per vector by the widest available kernel.
    pub vector_width: usize,
}

impl SimdCapabilities {
    /// Detect available SIMD capabilities on the current CPU.
    #[must_use]
    pub fn detect() -> Self {
        let mut caps = Self { has_avx2: false, has_neon: false, vector_width: 1 };

        #[cfg(target_arch = "x86_64")]
        {
            caps.has_avx2 = is_x86_feature_detected!("avx2");
            if caps.has_avx2 {
                caps.vector_width = 32;
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            caps.has_neon = std::arch::is_aarch64_feature_detected!("neon");
            if caps.has_neon {
                caps.vector_width = 16;
            }
        }

        caps
    }
}

/// Encode `width`-bit codes from `text` using the widest available kernel
/// above [`DISPATCH_THRESHOLD`], falling back to the scalar packer.
///
/// `char_to_code` maps an accepted input byte to its `width`-bit code, or
/// returns `None` for a byte outside the alphabet.
pub(crate) fn encode_dispatch(
    text: &[u8],
    width: u8,
    char_to_code: impl Fn(u8) -> Option<u8> + Copy,
) -> crate::error::KmerResult<super::PackedSequence> {
    let caps = SimdCapabilities::detect();

    if text.len() >= DISPATCH_THRESHOLD {
        #[cfg(target_arch = "x86_64")]
        if caps.has_avx2 {
            // SAFETY: `has_avx2` was just confirmed via runtime detection.
            return unsafe { x86_avx2::encode_chunk_avx2(text, width, char_to_code) };
        }

        #[cfg(target_arch = "aarch64")]
        if caps.has_neon {
            // SAFETY: `has_neon` was just confirmed via runtime detection.
            return unsafe { arm64_neon::encode_chunk_neon(text, width, char_to_code) };
        }
    }

    let _ = caps;
    encode_scalar(text, width, char_to_code)
}

/// Scalar fallback shared by every kernel: map each byte to its code, then
/// pack.
pub(crate) fn encode_scalar(
    text: &[u8],
    width: u8,
    char_to_code: impl Fn(u8) -> Option<u8>,
) -> crate::error::KmerResult<super::PackedSequence> {
    let mut codes = Vec::with_capacity(text.len());
    for &byte in text {
        let code = char_to_code(byte)
            .ok_or(crate::error::KmerError::InvalidCharacter { byte, width })?;
        codes.push(code);
    }
    Ok(super::pack_codes(&codes, width))
}

/// Decode a packed sequence using the widest available kernel above
/// [`DISPATCH_THRESHOLD`], falling back to the scalar unpacker.
///
/// `code_to_char` maps a `width`-bit code back to text, or returns `None`
/// for an invalid code (e.g. the forbidden four-bit 0000).
pub(crate) fn decode_dispatch(
    packed: &super::PackedSequence,
    width: u8,
    code_to_char: impl Fn(u8) -> Option<u8> + Copy,
) -> crate::error::KmerResult<Vec<u8>> {
    let codes = super::unpack_codes(packed, width)?;
    let caps = SimdCapabilities::detect();

    if codes.len() >= DISPATCH_THRESHOLD {
        #[cfg(target_arch = "x86_64")]
        if caps.has_avx2 {
            // SAFETY: `has_avx2` was just confirmed via runtime detection.
            return unsafe { x86_avx2::decode_codes_avx2(&codes, code_to_char) };
        }

        #[cfg(target_arch = "aarch64")]
        if caps.has_neon {
            // SAFETY: `has_neon` was just confirmed via runtime detection.
            return unsafe { arm64_neon::decode_codes_neon(&codes, code_to_char) };
        }
    }

    let _ = caps;
    decode_scalar(&codes, code_to_char)
}

/// Scalar fallback: map each code back to text.
pub(crate) fn decode_scalar(
    codes: &[u8],
    code_to_char: impl Fn(u8) -> Option<u8>,
) -> crate::error::KmerResult<Vec<u8>> {
    let mut text = Vec::with_capacity(codes.len());
    for &code in codes {
        let byte = code_to_char(code).ok_or(crate::error::KmerError::InvalidFourBitCode)?;
        text.push(byte);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_detect_without_panicking() {
        let caps = SimdCapabilities::detect();
        assert!(caps.vector_width >= 1);
    }
}
