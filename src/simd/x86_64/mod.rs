//! x86_64 SIMD implementations
//!
//! Safe entry points over the SSSE3, AVX2 and AVX-512 kernels. The width a
//! caller passes comes from a [`SimdStrategy`](crate::simd::SimdStrategy),
//! which never exceeds the detected CPU support; that is the invariant the
//! `unsafe` dispatch below relies on.

pub(crate) mod common;
mod boolean;
mod float;
mod integer;

use crate::encoders::DecodeError;
use crate::msgpack::BufferWriter;
use crate::simd::VectorWidth;
use crate::simd::tables::ShuffleTable;

/// Encodes native integer lanes; `bytes.len()` is a multiple of the width.
pub(crate) fn encode_integers<W: BufferWriter>(
    width: VectorWidth,
    table: &ShuffleTable,
    bytes: &[u8],
    writer: &mut W,
) {
    // SAFETY: `width` never exceeds the detected support
    unsafe {
        match width {
            VectorWidth::V512 => integer::encode_avx512(table, bytes, writer),
            VectorWidth::V256 => integer::encode_avx2(table, bytes, writer),
            VectorWidth::V128 => integer::encode_ssse3(table, bytes, writer),
            VectorWidth::Scalar => unreachable!("scalar width has no vector kernel"),
        }
    }
}

pub(crate) fn encode_f32<W: BufferWriter>(width: VectorWidth, data: &[f32], writer: &mut W) {
    // SAFETY: `width` never exceeds the detected support
    unsafe {
        match width {
            VectorWidth::V512 => float::encode_f32_avx512(data, writer),
            VectorWidth::V256 => float::encode_f32_avx2(data, writer),
            VectorWidth::V128 => float::encode_f32_ssse3(data, writer),
            VectorWidth::Scalar => unreachable!("scalar width has no vector kernel"),
        }
    }
}

pub(crate) fn encode_f64<W: BufferWriter>(width: VectorWidth, data: &[f64], writer: &mut W) {
    // SAFETY: `width` never exceeds the detected support
    unsafe {
        match width {
            VectorWidth::V512 => float::encode_f64_avx512(data, writer),
            VectorWidth::V256 => float::encode_f64_avx2(data, writer),
            VectorWidth::V128 => float::encode_f64_ssse3(data, writer),
            VectorWidth::Scalar => unreachable!("scalar width has no vector kernel"),
        }
    }
}

pub(crate) fn encode_bools<W: BufferWriter>(width: VectorWidth, data: &[bool], writer: &mut W) {
    // SAFETY: `width` never exceeds the detected support
    unsafe {
        match width {
            VectorWidth::V512 => boolean::encode_avx512(data, writer),
            VectorWidth::V256 => boolean::encode_avx2(data, writer),
            VectorWidth::V128 => boolean::encode_ssse3(data, writer),
            VectorWidth::Scalar => unreachable!("scalar width has no vector kernel"),
        }
    }
}

/// Validates and converts boolean codes; `src.len()` is a multiple of the
/// width and `offset` is the absolute position of `src[0]`.
pub(crate) fn decode_bools(
    width: VectorWidth,
    src: &[u8],
    dst: &mut [bool],
    offset: usize,
) -> Result<(), DecodeError> {
    // SAFETY: `width` never exceeds the detected support
    unsafe {
        match width {
            VectorWidth::V512 => boolean::decode_avx512(src, dst, offset),
            VectorWidth::V256 => boolean::decode_avx2(src, dst, offset),
            VectorWidth::V128 => boolean::decode_ssse3(src, dst, offset),
            VectorWidth::Scalar => unreachable!("scalar width has no vector kernel"),
        }
    }
}
