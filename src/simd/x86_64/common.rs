//! Common utilities and scaffolding for the x86_64 kernels
//!
//! Threshold splatting, the per-sub-group shuffle, and the two store flavors
//! (an emulated masked store through a stack buffer for SSSE3/AVX2 and a
//! real masked store for AVX-512).

use std::arch::x86_64::*;

use crate::simd::tables::{BLOCK_BYTES, IntegerKind, ShuffleEntry};

/// Calculate number of full blocks and remainder offset
///
/// Returns (num_full_blocks, simd_processed_bytes)
#[inline(always)]
pub fn calculate_blocks(data_len: usize, block_size: usize) -> (usize, usize) {
    let num_blocks = data_len / block_size;
    let simd_bytes = num_blocks * block_size;
    (num_blocks, simd_bytes)
}

/// Threshold truncated to the lane width and sign-extended to `i32`.
#[inline]
pub fn lane_bits(kind: IntegerKind, threshold: i64) -> i32 {
    match kind.width() {
        1 => threshold as i8 as i32,
        2 => threshold as i16 as i32,
        _ => threshold as i32,
    }
}

/// Lane pattern XOR-ed into unsigned values so signed compares order them.
#[inline]
pub fn sign_bias(kind: IntegerKind) -> i32 {
    if kind.is_signed() {
        return 0;
    }
    match kind.width() {
        1 => i8::MIN as i32,
        2 => i16::MIN as i32,
        _ => i32::MIN,
    }
}

/// Threshold as seen by a signed compare of biased lanes.
#[inline]
pub fn compare_threshold(kind: IntegerKind, threshold: i64) -> i32 {
    lane_bits(kind, threshold) ^ sign_bias(kind)
}

/// Shuffles one 8-byte sub-group (the low half of `src`) into its packed
/// MessagePack form.
#[target_feature(enable = "ssse3")]
#[inline]
pub unsafe fn pack_group(src: __m128i, entry: &ShuffleEntry) -> __m128i {
    unsafe {
        let shuffle = _mm_loadu_si128(entry.shuffle.as_ptr().cast());
        let tags = _mm_loadu_si128(entry.tags.as_ptr().cast());
        _mm_or_si128(_mm_shuffle_epi8(src, shuffle), tags)
    }
}

/// Writes the first `len` bytes of `v` to the front of `out`.
#[inline]
pub fn store_prefix(out: &mut [u8], v: __m128i, len: usize) {
    let mut tmp = [0u8; BLOCK_BYTES];
    // SAFETY: `tmp` holds exactly one unaligned 128-bit store.
    unsafe { _mm_storeu_si128(tmp.as_mut_ptr().cast(), v) };
    out[..len].copy_from_slice(&tmp[..len]);
}

/// Packs both sub-groups of a 16-byte block into `out`; returns the bytes
/// written.
#[target_feature(enable = "ssse3")]
#[inline]
pub unsafe fn emit_block(
    block: __m128i,
    lo: &ShuffleEntry,
    hi: &ShuffleEntry,
    out: &mut [u8],
) -> usize {
    unsafe {
        let first = pack_group(block, lo);
        let second = pack_group(_mm_unpackhi_epi64(block, block), hi);
        let n0 = lo.len as usize;
        let n1 = hi.len as usize;
        store_prefix(out, first, n0);
        store_prefix(&mut out[n0..], second, n1);
        n0 + n1
    }
}

#[inline(always)]
fn prefix_mask(len: usize) -> __mmask16 {
    ((1u32 << len) - 1) as __mmask16
}

/// [`emit_block`] with AVX-512 masked stores.
#[target_feature(enable = "avx512f,avx512bw,avx512vl")]
#[inline]
pub unsafe fn emit_block_masked(
    block: __m128i,
    lo: &ShuffleEntry,
    hi: &ShuffleEntry,
    out: &mut [u8],
) -> usize {
    unsafe {
        let n0 = lo.len as usize;
        let n1 = hi.len as usize;
        // Bounds are checked here so the masked stores stay inside `out`.
        let dst = &mut out[..n0 + n1];
        let first = pack_group(block, lo);
        let second = pack_group(_mm_unpackhi_epi64(block, block), hi);
        _mm_mask_storeu_epi8(dst.as_mut_ptr().cast(), prefix_mask(n0), first);
        _mm_mask_storeu_epi8(dst.as_mut_ptr().add(n0).cast(), prefix_mask(n1), second);
        n0 + n1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_blocks() {
        assert_eq!(calculate_blocks(0, 16), (0, 0));
        assert_eq!(calculate_blocks(33, 16), (2, 32));
    }

    #[test]
    fn test_biased_thresholds_keep_order() {
        // 127 and 255 as u8 lanes must compare below 128 and 256 once biased.
        let t127 = compare_threshold(IntegerKind::U8, 127) as i8;
        let t255 = compare_threshold(IntegerKind::U8, 255) as i8;
        assert_eq!(t127, -1);
        assert_eq!(t255, 127);
        let v200 = (200u8 ^ 0x80) as i8;
        assert!(v200 > t127);
        assert!(v200 <= t255);

        assert_eq!(compare_threshold(IntegerKind::I16, -129), -129);
        assert_eq!(
            compare_threshold(IntegerKind::U32, 65535),
            (65535u32 ^ 0x8000_0000) as i32
        );
    }

    #[test]
    fn test_prefix_mask() {
        assert_eq!(prefix_mask(0), 0);
        assert_eq!(prefix_mask(5), 0b11111);
        assert_eq!(prefix_mask(16), 0xffff);
    }
}
