//! Float array kernels for SSSE3, AVX2 and AVX-512
//!
//! Every 128-bit lane of input produces one packed 16-byte vector plus a
//! short remainder:
//! - f32: 4 floats -> 20 bytes (`ca` + 4 big-endian bytes each); the
//!   shuffle covers 16, the last float's final 4 bytes come from a second
//!   shuffle moved out through a general register
//! - f64: 2 doubles -> 18 bytes (`cb` + 8 big-endian bytes each); the
//!   second shuffle supplies the final 2 bytes
//!
//! The writer is asked for N×5 or N×9 bytes up front, so the kernels store
//! straight into the granted span.

use std::arch::x86_64::*;

use num_traits::Float;

use crate::msgpack::{BufferWriter, codes};

const Z: i8 = -128;
const F32: i8 = codes::FLOAT32 as i8;
const F64: i8 = codes::FLOAT64 as i8;

#[target_feature(enable = "sse2")]
#[inline]
unsafe fn f32_masks() -> (__m128i, __m128i, __m128i) {
    let m0 = _mm_setr_epi8(Z, 3, 2, 1, 0, Z, 7, 6, 5, 4, Z, 11, 10, 9, 8, Z);
    let t0 = _mm_setr_epi8(F32, 0, 0, 0, 0, F32, 0, 0, 0, 0, F32, 0, 0, 0, 0, F32);
    let m1 = _mm_setr_epi8(15, 14, 13, 12, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z);
    (m0, t0, m1)
}

#[target_feature(enable = "sse2")]
#[inline]
unsafe fn f64_masks() -> (__m128i, __m128i, __m128i) {
    let m0 = _mm_setr_epi8(Z, 7, 6, 5, 4, 3, 2, 1, 0, Z, 15, 14, 13, 12, 11, 10);
    let t0 = _mm_setr_epi8(F64, 0, 0, 0, 0, 0, 0, 0, 0, F64, 0, 0, 0, 0, 0, 0);
    let m1 = _mm_setr_epi8(9, 8, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z);
    (m0, t0, m1)
}

/// Stores one lane's packed vector and its `tail_len`-byte remainder.
#[target_feature(enable = "sse2")]
#[inline]
unsafe fn store_lane(out: &mut [u8], packed: __m128i, tail: __m128i, tail_len: usize) {
    unsafe {
        let dst = &mut out[..16 + tail_len];
        _mm_storeu_si128(dst.as_mut_ptr().cast(), packed);
        let rest = (_mm_cvtsi128_si32(tail) as u32).to_le_bytes();
        dst[16..].copy_from_slice(&rest[..tail_len]);
    }
}

/// Encodes a multiple of 4 floats with SSSE3.
#[target_feature(enable = "ssse3")]
pub unsafe fn encode_f32_ssse3<W: BufferWriter>(data: &[f32], writer: &mut W) {
    unsafe {
        const PER_LANE: usize = 4;
        const OUT_LANE: usize = 20;

        let (m0, t0, m1) = f32_masks();
        let total = data.len() / PER_LANE * OUT_LANE;
        let span = &mut writer.get_span(total)[..total];

        for (chunk, out) in data
            .chunks_exact(PER_LANE)
            .zip(span.chunks_exact_mut(OUT_LANE))
        {
            let v = _mm_loadu_si128(chunk.as_ptr().cast());
            let packed = _mm_or_si128(_mm_shuffle_epi8(v, m0), t0);
            store_lane(out, packed, _mm_shuffle_epi8(v, m1), 4);
        }
        writer.advance(total);
    }
}

/// Encodes a multiple of 2 doubles with SSSE3.
#[target_feature(enable = "ssse3")]
pub unsafe fn encode_f64_ssse3<W: BufferWriter>(data: &[f64], writer: &mut W) {
    unsafe {
        const PER_LANE: usize = 2;
        const OUT_LANE: usize = 18;

        let (m0, t0, m1) = f64_masks();
        let total = data.len() / PER_LANE * OUT_LANE;
        let span = &mut writer.get_span(total)[..total];

        for (chunk, out) in data
            .chunks_exact(PER_LANE)
            .zip(span.chunks_exact_mut(OUT_LANE))
        {
            let v = _mm_loadu_si128(chunk.as_ptr().cast());
            let packed = _mm_or_si128(_mm_shuffle_epi8(v, m0), t0);
            store_lane(out, packed, _mm_shuffle_epi8(v, m1), 2);
        }
        writer.advance(total);
    }
}

/// Shared AVX2 body; each 128-bit lane of input yields `lane_out` bytes.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn encode_avx2_impl<W: BufferWriter>(
    bytes: &[u8],
    masks: (__m128i, __m128i, __m128i),
    lane_out: usize,
    writer: &mut W,
) {
    unsafe {
        const BLOCK_SIZE: usize = 32;

        let (m0, t0, m1) = masks;
        let m0 = _mm256_broadcastsi128_si256(m0);
        let t0 = _mm256_broadcastsi128_si256(t0);
        let m1 = _mm256_broadcastsi128_si256(m1);
        let tail_len = lane_out - 16;
        let total = bytes.len() / BLOCK_SIZE * 2 * lane_out;
        let span = &mut writer.get_span(total)[..total];

        for (src, out) in bytes
            .chunks_exact(BLOCK_SIZE)
            .zip(span.chunks_exact_mut(2 * lane_out))
        {
            let v = _mm256_loadu_si256(src.as_ptr().cast());
            let packed = _mm256_or_si256(_mm256_shuffle_epi8(v, m0), t0);
            let tail = _mm256_shuffle_epi8(v, m1);
            store_lane(
                out,
                _mm256_castsi256_si128(packed),
                _mm256_castsi256_si128(tail),
                tail_len,
            );
            store_lane(
                &mut out[lane_out..],
                _mm256_extracti128_si256::<1>(packed),
                _mm256_extracti128_si256::<1>(tail),
                tail_len,
            );
        }
        writer.advance(total);
    }
}

/// Encodes a multiple of 8 floats with AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn encode_f32_avx2<W: BufferWriter>(data: &[f32], writer: &mut W) {
    unsafe { encode_avx2_impl(as_bytes(data), f32_masks(), 20, writer) }
}

/// Encodes a multiple of 4 doubles with AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn encode_f64_avx2<W: BufferWriter>(data: &[f64], writer: &mut W) {
    unsafe { encode_avx2_impl(as_bytes(data), f64_masks(), 18, writer) }
}

#[target_feature(enable = "avx512f,avx512bw,avx2")]
#[inline]
unsafe fn encode_avx512_impl<W: BufferWriter>(
    bytes: &[u8],
    masks: (__m128i, __m128i, __m128i),
    lane_out: usize,
    writer: &mut W,
) {
    unsafe {
        const BLOCK_SIZE: usize = 64;

        let (m0, t0, m1) = masks;
        let m0 = _mm512_broadcast_i32x4(m0);
        let t0 = _mm512_broadcast_i32x4(t0);
        let m1 = _mm512_broadcast_i32x4(m1);
        let tail_len = lane_out - 16;
        let total = bytes.len() / BLOCK_SIZE * 4 * lane_out;
        let span = &mut writer.get_span(total)[..total];

        for (src, out) in bytes
            .chunks_exact(BLOCK_SIZE)
            .zip(span.chunks_exact_mut(4 * lane_out))
        {
            let v = _mm512_loadu_si512(src.as_ptr().cast());
            let packed = _mm512_or_si512(_mm512_shuffle_epi8(v, m0), t0);
            let tail = _mm512_shuffle_epi8(v, m1);
            let lanes = [
                (
                    _mm512_extracti32x4_epi32::<0>(packed),
                    _mm512_extracti32x4_epi32::<0>(tail),
                ),
                (
                    _mm512_extracti32x4_epi32::<1>(packed),
                    _mm512_extracti32x4_epi32::<1>(tail),
                ),
                (
                    _mm512_extracti32x4_epi32::<2>(packed),
                    _mm512_extracti32x4_epi32::<2>(tail),
                ),
                (
                    _mm512_extracti32x4_epi32::<3>(packed),
                    _mm512_extracti32x4_epi32::<3>(tail),
                ),
            ];
            for (k, (lane, lane_tail)) in lanes.into_iter().enumerate() {
                store_lane(&mut out[k * lane_out..], lane, lane_tail, tail_len);
            }
        }
        writer.advance(total);
    }
}

/// Encodes a multiple of 16 floats with AVX-512.
#[target_feature(enable = "avx512f,avx512bw,avx2")]
pub unsafe fn encode_f32_avx512<W: BufferWriter>(data: &[f32], writer: &mut W) {
    unsafe { encode_avx512_impl(as_bytes(data), f32_masks(), 20, writer) }
}

/// Encodes a multiple of 8 doubles with AVX-512.
#[target_feature(enable = "avx512f,avx512bw,avx2")]
pub unsafe fn encode_f64_avx512<W: BufferWriter>(data: &[f64], writer: &mut W) {
    unsafe { encode_avx512_impl(as_bytes(data), f64_masks(), 18, writer) }
}

#[inline]
fn as_bytes<T: Float>(data: &[T]) -> &[u8] {
    // SAFETY: `Float` is only implemented for f32 and f64, which have no
    // padding and no invalid bit patterns.
    unsafe { std::slice::from_raw_parts(data.as_ptr().cast(), std::mem::size_of_val(data)) }
}
