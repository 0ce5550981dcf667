//! aarch64 SIMD implementations
//!
//! NEON provides the 128-bit width only; wider requests are clamped by the
//! strategy before they get here.

pub(crate) mod common;
mod boolean;
mod float;
mod integer;

use crate::encoders::DecodeError;
use crate::msgpack::BufferWriter;
use crate::simd::VectorWidth;
use crate::simd::tables::ShuffleTable;

pub(crate) fn encode_integers<W: BufferWriter>(
    width: VectorWidth,
    table: &ShuffleTable,
    bytes: &[u8],
    writer: &mut W,
) {
    debug_assert_eq!(width, VectorWidth::V128);
    // SAFETY: NEON was detected before any vector width was selected
    unsafe { integer::encode_neon(table, bytes, writer) }
}

pub(crate) fn encode_f32<W: BufferWriter>(width: VectorWidth, data: &[f32], writer: &mut W) {
    debug_assert_eq!(width, VectorWidth::V128);
    // SAFETY: see `encode_integers`
    unsafe { float::encode_f32_neon(data, writer) }
}

pub(crate) fn encode_f64<W: BufferWriter>(width: VectorWidth, data: &[f64], writer: &mut W) {
    debug_assert_eq!(width, VectorWidth::V128);
    // SAFETY: see `encode_integers`
    unsafe { float::encode_f64_neon(data, writer) }
}

pub(crate) fn encode_bools<W: BufferWriter>(width: VectorWidth, data: &[bool], writer: &mut W) {
    debug_assert_eq!(width, VectorWidth::V128);
    // SAFETY: see `encode_integers`
    unsafe { boolean::encode_neon(data, writer) }
}

pub(crate) fn decode_bools(
    width: VectorWidth,
    src: &[u8],
    dst: &mut [bool],
    offset: usize,
) -> Result<(), DecodeError> {
    debug_assert_eq!(width, VectorWidth::V128);
    // SAFETY: see `encode_integers`
    unsafe { boolean::decode_neon(src, dst, offset) }
}
