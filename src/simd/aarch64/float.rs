//! NEON float array kernels
//!
//! 4 floats -> 20 bytes, 2 doubles -> 18 bytes per register, using the
//! same shuffle/tag layout as the x86 kernels with `tbl` in place of
//! `pshufb`.

use std::arch::aarch64::*;

use crate::msgpack::{BufferWriter, codes};

const Z: u8 = 0x80;
const F32: u8 = codes::FLOAT32;
const F64: u8 = codes::FLOAT64;

const F32_SHUFFLE: [u8; 16] = [Z, 3, 2, 1, 0, Z, 7, 6, 5, 4, Z, 11, 10, 9, 8, Z];
const F32_TAGS: [u8; 16] = [F32, 0, 0, 0, 0, F32, 0, 0, 0, 0, F32, 0, 0, 0, 0, F32];
const F32_TAIL: [u8; 16] = [15, 14, 13, 12, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z];

const F64_SHUFFLE: [u8; 16] = [Z, 7, 6, 5, 4, 3, 2, 1, 0, Z, 15, 14, 13, 12, 11, 10];
const F64_TAGS: [u8; 16] = [F64, 0, 0, 0, 0, 0, 0, 0, 0, F64, 0, 0, 0, 0, 0, 0];
const F64_TAIL: [u8; 16] = [9, 8, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z];

#[target_feature(enable = "neon")]
unsafe fn encode_impl<W: BufferWriter>(
    bytes: &[u8],
    masks: (&[u8; 16], &[u8; 16], &[u8; 16]),
    lane_out: usize,
    writer: &mut W,
) {
    unsafe {
        const BLOCK_SIZE: usize = 16;

        let shuffle = vld1q_u8(masks.0.as_ptr());
        let tags = vld1q_u8(masks.1.as_ptr());
        let tail_shuffle = vld1q_u8(masks.2.as_ptr());
        let tail_len = lane_out - BLOCK_SIZE;
        let total = bytes.len() / BLOCK_SIZE * lane_out;
        let span = &mut writer.get_span(total)[..total];

        for (src, out) in bytes
            .chunks_exact(BLOCK_SIZE)
            .zip(span.chunks_exact_mut(lane_out))
        {
            let v = vld1q_u8(src.as_ptr());
            let packed = vorrq_u8(vqtbl1q_u8(v, shuffle), tags);
            vst1q_u8(out.as_mut_ptr(), packed);
            let tail = vgetq_lane_u32::<0>(vreinterpretq_u32_u8(vqtbl1q_u8(v, tail_shuffle)));
            out[BLOCK_SIZE..].copy_from_slice(&tail.to_le_bytes()[..tail_len]);
        }
        writer.advance(total);
    }
}

/// Encodes a multiple of 4 floats.
#[target_feature(enable = "neon")]
pub unsafe fn encode_f32_neon<W: BufferWriter>(data: &[f32], writer: &mut W) {
    // SAFETY: f32 has no padding
    let bytes = unsafe {
        std::slice::from_raw_parts(data.as_ptr().cast::<u8>(), std::mem::size_of_val(data))
    };
    unsafe { encode_impl(bytes, (&F32_SHUFFLE, &F32_TAGS, &F32_TAIL), 20, writer) }
}

/// Encodes a multiple of 2 doubles.
#[target_feature(enable = "neon")]
pub unsafe fn encode_f64_neon<W: BufferWriter>(data: &[f64], writer: &mut W) {
    // SAFETY: f64 has no padding
    let bytes = unsafe {
        std::slice::from_raw_parts(data.as_ptr().cast::<u8>(), std::mem::size_of_val(data))
    };
    unsafe { encode_impl(bytes, (&F64_SHUFFLE, &F64_TAGS, &F64_TAIL), 18, writer) }
}
