//! NEON integer array kernel
//!
//! Same plan as the x86 kernels: count exceeded thresholds per lane with
//! native signed or unsigned compares, fold each 8-byte sub-group's counts
//! into a table index, then `tbl` + `orr` and store `len` bytes.

use std::arch::aarch64::*;

use super::common::emit_block;
use crate::msgpack::BufferWriter;
use crate::simd::tables::{GROUP_BYTES, IntegerKind, ShuffleTable};

const BLOCK_SIZE: usize = 16;
const MAX_THRESHOLDS: usize = 6;

/// Threshold broadcast to every lane of the kind's width.
#[target_feature(enable = "neon")]
#[inline]
unsafe fn splat(kind: IntegerKind, threshold: i64) -> uint8x16_t {
    match kind.width() {
        1 => vdupq_n_u8(threshold as u8),
        2 => vreinterpretq_u8_u16(vdupq_n_u16(threshold as u16)),
        _ => vreinterpretq_u8_u32(vdupq_n_u32(threshold as u32)),
    }
}

/// Per-lane count of thresholds exceeded, as lane-width integers.
#[target_feature(enable = "neon")]
#[inline]
unsafe fn count_tiers<const LANE: usize>(
    block: uint8x16_t,
    thresholds: &[uint8x16_t],
    signed: bool,
) -> uint8x16_t {
    match LANE {
        1 => {
            let mut acc = vdupq_n_u8(0);
            for &t in thresholds {
                let gt = if signed {
                    vcgtq_s8(vreinterpretq_s8_u8(block), vreinterpretq_s8_u8(t))
                } else {
                    vcgtq_u8(block, t)
                };
                acc = vsubq_u8(acc, gt);
            }
            acc
        }
        2 => {
            let v = vreinterpretq_u16_u8(block);
            let mut acc = vdupq_n_u16(0);
            for &t in thresholds {
                let t = vreinterpretq_u16_u8(t);
                let gt = if signed {
                    vcgtq_s16(vreinterpretq_s16_u16(v), vreinterpretq_s16_u16(t))
                } else {
                    vcgtq_u16(v, t)
                };
                acc = vsubq_u16(acc, gt);
            }
            vreinterpretq_u8_u16(acc)
        }
        _ => {
            let v = vreinterpretq_u32_u8(block);
            let mut acc = vdupq_n_u32(0);
            for &t in thresholds {
                let t = vreinterpretq_u32_u8(t);
                let gt = if signed {
                    vcgtq_s32(vreinterpretq_s32_u32(v), vreinterpretq_s32_u32(t))
                } else {
                    vcgtq_u32(v, t)
                };
                acc = vsubq_u32(acc, gt);
            }
            vreinterpretq_u8_u32(acc)
        }
    }
}

/// Encodes `bytes` (native lanes of the table's kind, a whole number of
/// 16-byte blocks) with NEON.
#[target_feature(enable = "neon")]
pub unsafe fn encode_neon<W: BufferWriter>(table: &ShuffleTable, bytes: &[u8], writer: &mut W) {
    unsafe {
        match table.layout().kind.width() {
            1 => encode_neon_lanes::<1, W>(table, bytes, writer),
            2 => encode_neon_lanes::<2, W>(table, bytes, writer),
            _ => encode_neon_lanes::<4, W>(table, bytes, writer),
        }
    }
}

#[target_feature(enable = "neon")]
unsafe fn encode_neon_lanes<const LANE: usize, W: BufferWriter>(
    table: &ShuffleTable,
    bytes: &[u8],
    writer: &mut W,
) {
    unsafe {
        let layout = table.layout();
        let kind = layout.kind;
        let signed = kind.is_signed();
        let count = layout.thresholds.len();
        let mut thresholds = [vdupq_n_u8(0); MAX_THRESHOLDS];
        for (slot, &t) in thresholds.iter_mut().zip(layout.thresholds) {
            *slot = splat(kind, t);
        }
        let fix_index = layout.uniform_index(layout.fix_tier);

        for src in bytes.chunks_exact(BLOCK_SIZE) {
            let block = vld1q_u8(src.as_ptr());
            let counts = count_tiers::<LANE>(block, &thresholds[..count], signed);
            let mut tiers = [0u8; BLOCK_SIZE];
            vst1q_u8(tiers.as_mut_ptr(), counts);
            let lo = layout.group_index_strided(&tiers[..GROUP_BYTES], LANE);
            let hi = layout.group_index_strided(&tiers[GROUP_BYTES..], LANE);

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
