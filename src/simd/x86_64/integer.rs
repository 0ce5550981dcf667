//! Integer array kernels for SSSE3, AVX2 and AVX-512
//!
//! Algorithm, per lane group:
//! 1. Load one register of lanes
//! 2. Count, per lane, how many tier thresholds the value exceeds
//!    (signed compares on sign-biased lanes; AVX-512 compares unsigned
//!    lanes natively and accumulates with mask-adds)
//! 3. Fold the counts of each 8-byte sub-group into a table index
//! 4. Request the lane group's total output from the writer
//! 5. Shuffle and tag each sub-group, store exactly `len` bytes
//!
//! Byte lanes have a single threshold, so the compare bitmask already is
//! the table index; blocks that are entirely fixints are copied as-is.

use std::arch::x86_64::*;

use super::common::{
    calculate_blocks, compare_threshold, emit_block, emit_block_masked, lane_bits, sign_bias,
};
use crate::msgpack::BufferWriter;
use crate::simd::tables::{GROUP_BYTES, ShuffleTable};

const MAX_THRESHOLDS: usize = 6;

#[target_feature(enable = "sse2")]
#[inline]
unsafe fn splat_128<const LANE: usize>(value: i32) -> __m128i {
    match LANE {
        1 => _mm_set1_epi8(value as i8),
        2 => _mm_set1_epi16(value as i16),
        _ => _mm_set1_epi32(value),
    }
}

/// Adds one to every lane of `acc` where `v > t`.
#[target_feature(enable = "sse2")]
#[inline]
unsafe fn count_gt_128<const LANE: usize>(acc: __m128i, v: __m128i, t: __m128i) -> __m128i {
    match LANE {
        1 => _mm_sub_epi8(acc, _mm_cmpgt_epi8(v, t)),
        2 => _mm_sub_epi16(acc, _mm_cmpgt_epi16(v, t)),
        _ => _mm_sub_epi32(acc, _mm_cmpgt_epi32(v, t)),
    }
}

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn splat_256<const LANE: usize>(value: i32) -> __m256i {
    match LANE {
        1 => _mm256_set1_epi8(value as i8),
        2 => _mm256_set1_epi16(value as i16),
        _ => _mm256_set1_epi32(value),
    }
}

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn count_gt_256<const LANE: usize>(acc: __m256i, v: __m256i, t: __m256i) -> __m256i {
    match LANE {
        1 => _mm256_sub_epi8(acc, _mm256_cmpgt_epi8(v, t)),
        2 => _mm256_sub_epi16(acc, _mm256_cmpgt_epi16(v, t)),
        _ => _mm256_sub_epi32(acc, _mm256_cmpgt_epi32(v, t)),
    }
}

#[target_feature(enable = "avx512f,avx512bw")]
#[inline]
unsafe fn splat_512<const LANE: usize>(value: i32) -> __m512i {
    match LANE {
        1 => _mm512_set1_epi8(value as i8),
        2 => _mm512_set1_epi16(value as i16),
        _ => _mm512_set1_epi32(value),
    }
}

#[target_feature(enable = "avx512f,avx512bw")]
#[inline]
unsafe fn count_gt_512<const LANE: usize>(
    signed: bool,
    acc: __m512i,
    v: __m512i,
    t: __m512i,
    ones: __m512i,
) -> __m512i {
    match LANE {
        2 => {
            let mask = if signed {
                _mm512_cmpgt_epi16_mask(v, t)
            } else {
                _mm512_cmpgt_epu16_mask(v, t)
            };
            _mm512_mask_add_epi16(acc, mask, acc, ones)
        }
        _ => {
            let mask = if signed {
                _mm512_cmpgt_epi32_mask(v, t)
            } else {
                _mm512_cmpgt_epu32_mask(v, t)
            };
            _mm512_mask_add_epi32(acc, mask, acc, ones)
        }
    }
}

/// Encodes `bytes` (native lanes of the table's kind, a whole number of
/// 16-byte blocks) with SSSE3.
#[target_feature(enable = "ssse3")]
pub unsafe fn encode_ssse3<W: BufferWriter>(table: &ShuffleTable, bytes: &[u8], writer: &mut W) {
    unsafe {
        match table.layout().kind.width() {
            1 => encode_ssse3_lanes::<1, W>(table, bytes, writer),
            2 => encode_ssse3_lanes::<2, W>(table, bytes, writer),
            _ => encode_ssse3_lanes::<4, W>(table, bytes, writer),
        }
    }
}

#[target_feature(enable = "ssse3")]
unsafe fn encode_ssse3_lanes<const LANE: usize, W: BufferWriter>(
    table: &ShuffleTable,
    bytes: &[u8],
    writer: &mut W,
) {
    unsafe {
        const BLOCK_SIZE: usize = 16;

        let layout = table.layout();
        let kind = layout.kind;
        let count = layout.thresholds.len();
        let bias = splat_128::<LANE>(sign_bias(kind));
        let mut thresholds = [_mm_setzero_si128(); MAX_THRESHOLDS];
        for (slot, &t) in thresholds.iter_mut().zip(layout.thresholds) {
            *slot = splat_128::<LANE>(compare_threshold(kind, t));
        }
        let fix_index = layout.uniform_index(layout.fix_tier);

        let (_, simd_bytes) = calculate_blocks(bytes.len(), BLOCK_SIZE);
        for src in bytes[..simd_bytes].chunks_exact(BLOCK_SIZE) {
            let block = _mm_loadu_si128(src.as_ptr().cast());
            let biased = _mm_xor_si128(block, bias);

            let (lo, hi) = if LANE == 1 {
                let mask = _mm_movemask_epi8(_mm_cmpgt_epi8(biased, thresholds[0])) as usize;
                (mask & 0xff, mask >> 8)
            } else {
                let mut acc = _mm_setzero_si128();
                for &t in &thresholds[..count] {
                    acc = count_gt_128::<LANE>(acc, biased, t);
                }
                let mut tiers = [0u8; BLOCK_SIZE];
                _mm_storeu_si128(tiers.as_mut_ptr().cast(), acc);
                (
                    layout.group_index_strided(&tiers[..GROUP_BYTES], LANE),
                    layout.group_index_strided(&tiers[GROUP_BYTES..], LANE),
                )
            };

            if LANE == 1 && lo == fix_index && hi == fix_index {
                writer.get_span(BLOCK_SIZE)[..BLOCK_SIZE].copy_from_slice(src);
                writer.advance(BLOCK_SIZE);
                continue;
            }

            let (first, second) = (table.entry(lo), table.entry(hi));
            let total = first.len as usize + second.len as usize;
            let written = emit_block(block, first, second, writer.get_span(total));
            writer.advance(written);
        }
    }
}

/// Encodes `bytes` (a whole number of 32-byte blocks) with AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn encode_avx2<W: BufferWriter>(table: &ShuffleTable, bytes: &[u8], writer: &mut W) {
    unsafe {
        match table.layout().kind.width() {
            1 => encode_avx2_lanes::<1, W>(table, bytes, writer),
            2 => encode_avx2_lanes::<2, W>(table, bytes, writer),
            _ => encode_avx2_lanes::<4, W>(table, bytes, writer),
        }
    }
}

#[target_feature(enable = "avx2")]
unsafe fn encode_avx2_lanes<const LANE: usize, W: BufferWriter>(
    table: &ShuffleTable,
    bytes: &[u8],
    writer: &mut W,
) {
    unsafe {
        const BLOCK_SIZE: usize = 32;
        const GROUPS: usize = BLOCK_SIZE / GROUP_BYTES;

        let layout = table.layout();
        let kind = layout.kind;
        let count = layout.thresholds.len();
        let bias = splat_256::<LANE>(sign_bias(kind));
        let mut thresholds = [_mm256_setzero_si256(); MAX_THRESHOLDS];
        for (slot, &t) in thresholds.iter_mut().zip(layout.thresholds) {
            *slot = splat_256::<LANE>(compare_threshold(kind, t));
        }
        let fix_index = layout.uniform_index(layout.fix_tier);

        let (_, simd_bytes) = calculate_blocks(bytes.len(), BLOCK_SIZE);
        for src in bytes[..simd_bytes].chunks_exact(BLOCK_SIZE) {
            let block = _mm256_loadu_si256(src.as_ptr().cast());
            let biased = _mm256_xor_si256(block, bias);

            let mut indices = [0usize; GROUPS];
            if LANE == 1 {
                let mask =
                    _mm256_movemask_epi8(_mm256_cmpgt_epi8(biased, thresholds[0])) as u32 as usize;
                for (g, index) in indices.iter_mut().enumerate() {
                    *index = (mask >> (g * GROUP_BYTES)) & 0xff;
                }
                if indices.iter().all(|&i| i == fix_index) {
                    writer.get_span(BLOCK_SIZE)[..BLOCK_SIZE].copy_from_slice(src);
                    writer.advance(BLOCK_SIZE);
                    continue;
                }
            } else {
                let mut acc = _mm256_setzero_si256();
                for &t in &thresholds[..count] {
                    acc = count_gt_256::<LANE>(acc, biased, t);
                }
                let mut tiers = [0u8; BLOCK_SIZE];
                _mm256_storeu_si256(tiers.as_mut_ptr().cast(), acc);
                for (g, index) in indices.iter_mut().enumerate() {
                    *index = layout.group_index_strided(&tiers[g * GROUP_BYTES..], LANE);
                }
            }

            let total: usize = indices.iter().map(|&i| table.entry(i).len as usize).sum();
            let span = &mut writer.get_span(total)[..total];
            let low = _mm256_castsi256_si128(block);
            let high = _mm256_extracti128_si256::<1>(block);
            let n = emit_block(low, table.entry(indices[0]), table.entry(indices[1]), span);
            emit_block(
                high,
                table.entry(indices[2]),
                table.entry(indices[3]),
                &mut span[n..],
            );
            writer.advance(total);
        }
    }
}

/// Encodes `bytes` (a whole number of 64-byte blocks) with AVX-512.
#[target_feature(enable = "avx512f,avx512bw,avx512vl,avx2")]
pub unsafe fn encode_avx512<W: BufferWriter>(table: &ShuffleTable, bytes: &[u8], writer: &mut W) {
    unsafe {
        match table.layout().kind.width() {
            1 => encode_avx512_lanes::<1, W>(table, bytes, writer),
            2 => encode_avx512_lanes::<2, W>(table, bytes, writer),
            _ => encode_avx512_lanes::<4, W>(table, bytes, writer),
        }
    }
}

#[target_feature(enable = "avx512f,avx512bw,avx512vl,avx2")]
unsafe fn encode_avx512_lanes<const LANE: usize, W: BufferWriter>(
    table: &ShuffleTable,
    bytes: &[u8],
    writer: &mut W,
) {
    unsafe {
        const BLOCK_SIZE: usize = 64;
        const GROUPS: usize = BLOCK_SIZE / GROUP_BYTES;

        let layout = table.layout();
        let kind = layout.kind;
        let signed = kind.is_signed();
        let count = layout.thresholds.len();
        let ones = splat_512::<LANE>(1);
        let mut thresholds = [_mm512_setzero_si512(); MAX_THRESHOLDS];
        for (slot, &t) in thresholds.iter_mut().zip(layout.thresholds) {
            *slot = splat_512::<LANE>(lane_bits(kind, t));
        }
        let fix_index = layout.uniform_index(layout.fix_tier);

        let (_, simd_bytes) = calculate_blocks(bytes.len(), BLOCK_SIZE);
        for src in bytes[..simd_bytes].chunks_exact(BLOCK_SIZE) {
            let block = _mm512_loadu_si512(src.as_ptr().cast());

            let mut indices = [0usize; GROUPS];
            if LANE == 1 {
                let mask = if signed {
                    _mm512_cmpgt_epi8_mask(block, thresholds[0])
                } else {
                    _mm512_cmpgt_epu8_mask(block, thresholds[0])
                };
                for (g, index) in indices.iter_mut().enumerate() {
                    *index = ((mask >> (g * GROUP_BYTES)) & 0xff) as usize;
                }
                if indices.iter().all(|&i| i == fix_index) {
                    writer.get_span(BLOCK_SIZE)[..BLOCK_SIZE].copy_from_slice(src);
                    writer.advance(BLOCK_SIZE);
                    continue;
                }
            } else {
                let mut acc = _mm512_setzero_si512();
                for &t in &thresholds[..count] {
                    acc = count_gt_512::<LANE>(signed, acc, block, t, ones);
                }
                let mut tiers = [0u8; BLOCK_SIZE];
                _mm512_storeu_si512(tiers.as_mut_ptr().cast(), acc);
                for (g, index) in indices.iter_mut().enumerate() {
                    *index = layout.group_index_strided(&tiers[g * GROUP_BYTES..], LANE);
                }
            }

            let total: usize = indices.iter().map(|&i| table.entry(i).len as usize).sum();
            let span = &mut writer.get_span(total)[..total];
            let lanes = [
                _mm512_extracti32x4_epi32::<0>(block),
                _mm512_extracti32x4_epi32::<1>(block),
                _mm512_extracti32x4_epi32::<2>(block),
                _mm512_extracti32x4_epi32::<3>(block),
            ];
            let mut offset = 0;
            for (k, lane) in lanes.into_iter().enumerate() {
                offset += emit_block_masked(
                    lane,
                    table.entry(indices[2 * k]),
                    table.entry(indices[2 * k + 1]),
                    &mut span[offset..],
                );
            }
            writer.advance(total);
        }
    }
}
