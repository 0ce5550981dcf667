//! NEON boolean array kernels

use std::arch::aarch64::*;

use crate::encoders::DecodeError;
use crate::msgpack::{BufferWriter, codes};

const BLOCK_SIZE: usize = 16;

#[target_feature(enable = "neon")]
pub unsafe fn encode_neon<W: BufferWriter>(data: &[bool], writer: &mut W) {
    unsafe {
        // SAFETY: bool is one byte with value 0 or 1
        let bytes = std::slice::from_raw_parts(data.as_ptr().cast::<u8>(), data.len());
        let total = bytes.len() / BLOCK_SIZE * BLOCK_SIZE;
        let span = &mut writer.get_span(total)[..total];
        let zero = vdupq_n_u8(0);
        let true_code = vdupq_n_u8(codes::TRUE);

        for (src, out) in bytes
            .chunks_exact(BLOCK_SIZE)
            .zip(span.chunks_exact_mut(BLOCK_SIZE))
        {
            let v = vld1q_u8(src.as_ptr());
            vst1q_u8(out.as_mut_ptr(), vaddq_u8(vceqq_u8(v, zero), true_code));
        }
        writer.advance(total);
    }
}

#[target_feature(enable = "neon")]
pub unsafe fn decode_neon(src: &[u8], dst: &mut [bool], offset: usize) -> Result<(), DecodeError> {
    unsafe {
        let true_code = vdupq_n_u8(codes::TRUE);
        let false_code = vdupq_n_u8(codes::FALSE);
        let one = vdupq_n_u8(1);
        let dst = &mut dst[..src.len()];

        for (i, (block, out)) in src
            .chunks_exact(BLOCK_SIZE)
            .zip(dst.chunks_exact_mut(BLOCK_SIZE))
            .enumerate()
        {
            let v = vld1q_u8(block.as_ptr());
            let is_true = vceqq_u8(v, true_code);
            let valid = vorrq_u8(is_true, vceqq_u8(v, false_code));
            if vminvq_u8(valid) != 0xff {
                let lane = block
                    .iter()
                    .position(|&b| b != codes::TRUE && b != codes::FALSE)
                    .unwrap_or(0);
                return Err(DecodeError::InvalidBoolean {
                    byte: block[lane],
                    position: offset + i * BLOCK_SIZE + lane,
                });
            }
            // Only 0 and 1 are stored, both valid `bool` bytes.
            vst1q_u8(out.as_mut_ptr().cast(), vandq_u8(is_true, one));
        }
        Ok(())
    }
}
