//! Boolean array kernels for SSSE3, AVX2 and AVX-512
//!
//! Encoding: `cmpeq(lane, 0)` is `0xff` for `false` and `0x00` for `true`;
//! adding a broadcast `0xc3` wraps the former to `0xc2`.
//!
//! Decoding: a block is valid when every lane equals `0xc3` or `0xc2`. The
//! `0xc3` compare masked down to `1` is the decoded `bool` byte.

use std::arch::x86_64::*;

use crate::encoders::DecodeError;
use crate::msgpack::{BufferWriter, codes};

const TRUE: i8 = codes::TRUE as i8;
const FALSE: i8 = codes::FALSE as i8;

#[inline]
fn bool_bytes(data: &[bool]) -> &[u8] {
    // SAFETY: bool is one byte with value 0 or 1.
    unsafe { std::slice::from_raw_parts(data.as_ptr().cast(), data.len()) }
}

/// Builds the error for the first lane missing from `valid`.
#[cold]
fn invalid_lane(src: &[u8], valid: u64, lanes: usize, offset: usize) -> DecodeError {
    let full = if lanes == 64 {
        u64::MAX
    } else {
        (1u64 << lanes) - 1
    };
    let lane = (!valid & full).trailing_zeros() as usize;
    DecodeError::InvalidBoolean {
        byte: src[lane],
        position: offset + lane,
    }
}

#[target_feature(enable = "ssse3")]
pub unsafe fn encode_ssse3<W: BufferWriter>(data: &[bool], writer: &mut W) {
    unsafe {
        const BLOCK_SIZE: usize = 16;

        let bytes = bool_bytes(data);
        let total = bytes.len() / BLOCK_SIZE * BLOCK_SIZE;
        let span = &mut writer.get_span(total)[..total];
        let zero = _mm_setzero_si128();
        let true_code = _mm_set1_epi8(TRUE);

        for (src, out) in bytes
            .chunks_exact(BLOCK_SIZE)
            .zip(span.chunks_exact_mut(BLOCK_SIZE))
        {
            let v = _mm_loadu_si128(src.as_ptr().cast());
            let packed = _mm_add_epi8(_mm_cmpeq_epi8(v, zero), true_code);
            _mm_storeu_si128(out.as_mut_ptr().cast(), packed);
        }
        writer.advance(total);
    }
}

#[target_feature(enable = "avx2")]
pub unsafe fn encode_avx2<W: BufferWriter>(data: &[bool], writer: &mut W) {
    unsafe {
        const BLOCK_SIZE: usize = 32;

        let bytes = bool_bytes(data);
        let total = bytes.len() / BLOCK_SIZE * BLOCK_SIZE;
        let span = &mut writer.get_span(total)[..total];
        let zero = _mm256_setzero_si256();
        let true_code = _mm256_set1_epi8(TRUE);

        for (src, out) in bytes
            .chunks_exact(BLOCK_SIZE)
            .zip(span.chunks_exact_mut(BLOCK_SIZE))
        {
            let v = _mm256_loadu_si256(src.as_ptr().cast());
            let packed = _mm256_add_epi8(_mm256_cmpeq_epi8(v, zero), true_code);
            _mm256_storeu_si256(out.as_mut_ptr().cast(), packed);
        }
        writer.advance(total);
    }
}

#[target_feature(enable = "avx512f,avx512bw")]
pub unsafe fn encode_avx512<W: BufferWriter>(data: &[bool], writer: &mut W) {
    unsafe {
        const BLOCK_SIZE: usize = 64;

        let bytes = bool_bytes(data);
        let total = bytes.len() / BLOCK_SIZE * BLOCK_SIZE;
        let span = &mut writer.get_span(total)[..total];
        let zero = _mm512_setzero_si512();
        let true_code = _mm512_set1_epi8(TRUE);

        for (src, out) in bytes
            .chunks_exact(BLOCK_SIZE)
            .zip(span.chunks_exact_mut(BLOCK_SIZE))
        {
            let v = _mm512_loadu_si512(src.as_ptr().cast());
            let falses = _mm512_movm_epi8(_mm512_cmpeq_epi8_mask(v, zero));
            _mm512_storeu_si512(out.as_mut_ptr().cast(), _mm512_add_epi8(falses, true_code));
        }
        writer.advance(total);
    }
}

/// Decodes `src` into `dst` 16 bytes at a time. `offset` is the absolute
/// input position of `src[0]`, used for error reporting.
#[target_feature(enable = "ssse3")]
pub unsafe fn decode_ssse3(src: &[u8], dst: &mut [bool], offset: usize) -> Result<(), DecodeError> {
    unsafe {
        const BLOCK_SIZE: usize = 16;

        let true_code = _mm_set1_epi8(TRUE);
        let false_code = _mm_set1_epi8(FALSE);
        let one = _mm_set1_epi8(1);
        let dst = &mut dst[..src.len()];

        for (i, (block, out)) in src
            .chunks_exact(BLOCK_SIZE)
            .zip(dst.chunks_exact_mut(BLOCK_SIZE))
            .enumerate()
        {
            let v = _mm_loadu_si128(block.as_ptr().cast());
            let is_true = _mm_cmpeq_epi8(v, true_code);
            let is_false = _mm_cmpeq_epi8(v, false_code);
            let valid = _mm_movemask_epi8(_mm_or_si128(is_true, is_false)) as u32 as u64;
            if valid != 0xffff {
                return Err(invalid_lane(block, valid, BLOCK_SIZE, offset + i * BLOCK_SIZE));
            }
            // Only 0 and 1 are stored, both valid `bool` bytes.
            _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_and_si128(is_true, one));
        }
        Ok(())
    }
}

#[target_feature(enable = "avx2")]
pub unsafe fn decode_avx2(src: &[u8], dst: &mut [bool], offset: usize) -> Result<(), DecodeError> {
    unsafe {
        const BLOCK_SIZE: usize = 32;

        let true_code = _mm256_set1_epi8(TRUE);
        let false_code = _mm256_set1_epi8(FALSE);
        let one = _mm256_set1_epi8(1);
        let dst = &mut dst[..src.len()];

        for (i, (block, out)) in src
            .chunks_exact(BLOCK_SIZE)
            .zip(dst.chunks_exact_mut(BLOCK_SIZE))
            .enumerate()
        {
            let v = _mm256_loadu_si256(block.as_ptr().cast());
            let is_true = _mm256_cmpeq_epi8(v, true_code);
            let is_false = _mm256_cmpeq_epi8(v, false_code);
            let valid = _mm256_movemask_epi8(_mm256_or_si256(is_true, is_false)) as u32 as u64;
            if valid != 0xffff_ffff {
                return Err(invalid_lane(block, valid, BLOCK_SIZE, offset + i * BLOCK_SIZE));
            }
            _mm256_storeu_si256(out.as_mut_ptr().cast(), _mm256_and_si256(is_true, one));
        }
        Ok(())
    }
}

#[target_feature(enable = "avx512f,avx512bw")]
pub unsafe fn decode_avx512(
    src: &[u8],
    dst: &mut [bool],
    offset: usize,
) -> Result<(), DecodeError> {
    unsafe {
        const BLOCK_SIZE: usize = 64;

        let true_code = _mm512_set1_epi8(TRUE);
        let false_code = _mm512_set1_epi8(FALSE);
        let one = _mm512_set1_epi8(1);
        let dst = &mut dst[..src.len()];

        for (i, (block, out)) in src
            .chunks_exact(BLOCK_SIZE)
            .zip(dst.chunks_exact_mut(BLOCK_SIZE))
            .enumerate()
        {
            let v = _mm512_loadu_si512(block.as_ptr().cast());
            let is_true = _mm512_cmpeq_epi8_mask(v, true_code);
            let valid = is_true | _mm512_cmpeq_epi8_mask(v, false_code);
            if valid != u64::MAX {
                return Err(invalid_lane(block, valid, BLOCK_SIZE, offset + i * BLOCK_SIZE));
            }
            _mm512_storeu_si512(out.as_mut_ptr().cast(), _mm512_maskz_mov_epi8(is_true, one));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_lane_reports_first_bad_byte() {
        let mut block = [codes::TRUE; 16];
        block[5] = 0x01;
        block[9] = 0xc0;
        let valid = 0xffffu64 & !(1 << 5) & !(1 << 9);
        let err = invalid_lane(&block, valid, 16, 100);
        assert_eq!(
            err,
            DecodeError::InvalidBoolean {
                byte: 0x01,
                position: 105
            }
        );
    }
}
