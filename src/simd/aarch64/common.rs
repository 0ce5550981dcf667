//! Common utilities for the NEON kernels

use std::arch::aarch64::*;

use crate::simd::tables::{BLOCK_BYTES, ShuffleEntry};

/// Shuffles one 8-byte sub-group (the low half of `src`) into its packed
/// MessagePack form. `tbl` yields zero for the `0x80` slots.
#[target_feature(enable = "neon")]
#[inline]
pub unsafe fn pack_group(src: uint8x16_t, entry: &ShuffleEntry) -> uint8x16_t {
    unsafe {
        let shuffle = vld1q_u8(entry.shuffle.as_ptr());
        let tags = vld1q_u8(entry.tags.as_ptr());
        vorrq_u8(vqtbl1q_u8(src, shuffle), tags)
    }
}

/// Writes the first `len` bytes of `v` to the front of `out`.
#[target_feature(enable = "neon")]
#[inline]
pub unsafe fn store_prefix(out: &mut [u8], v: uint8x16_t, len: usize) {
    let mut tmp = [0u8; BLOCK_BYTES];
    unsafe { vst1q_u8(tmp.as_mut_ptr(), v) };
    out[..len].copy_from_slice(&tmp[..len]);
}

/// Packs both sub-groups of a 16-byte block into `out`; returns the bytes
/// written.
#[target_feature(enable = "neon")]
#[inline]
pub unsafe fn emit_block(
    block: uint8x16_t,
    lo: &ShuffleEntry,
    hi: &ShuffleEntry,
    out: &mut [u8],
) -> usize {
    unsafe {
        let first = pack_group(block, lo);
        let second = pack_group(vextq_u8::<8>(block, block), hi);
        let n0 = lo.len as usize;
        let n1 = hi.len as usize;
        store_prefix(out, first, n0);
        store_prefix(&mut out[n0..], second, n1);
        n0 + n1
    }
}
