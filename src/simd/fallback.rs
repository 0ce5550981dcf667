//! Portable stand-ins for the vector kernels.
//!
//! Compiled on targets without a vector implementation (or without the
//! `simd` feature). Detection reports [`VectorWidth::Scalar`] there, so the
//! pipeline routes everything through the scalar writer; these functions
//! keep the dispatch surface identical and emit the same bytes if reached.

use crate::encoders::DecodeError;
use crate::msgpack::{BufferWriter, codes, scalar};
use crate::simd::VectorWidth;
use crate::simd::tables::{IntegerKind, ShuffleTable};

fn put<W: BufferWriter>(writer: &mut W, max_len: usize, encode: impl FnOnce(&mut [u8]) -> usize) {
    let written = encode(writer.get_span(max_len));
    writer.advance(written);
}

pub(crate) fn encode_integers<W: BufferWriter>(
    _width: VectorWidth,
    table: &ShuffleTable,
    bytes: &[u8],
    writer: &mut W,
) {
    let kind = table.layout().kind;
    for lane in bytes.chunks_exact(kind.width()) {
        let value = match kind {
            IntegerKind::I8 => lane[0] as i8 as i64,
            IntegerKind::U8 => lane[0] as i64,
            IntegerKind::I16 => i16::from_ne_bytes([lane[0], lane[1]]) as i64,
            IntegerKind::U16 => u16::from_ne_bytes([lane[0], lane[1]]) as i64,
            IntegerKind::I32 => i32::from_ne_bytes([lane[0], lane[1], lane[2], lane[3]]) as i64,
            _ => u32::from_ne_bytes([lane[0], lane[1], lane[2], lane[3]]) as i64,
        };
        put(writer, scalar::MAX_INT_LEN, |span| scalar::write_i64(span, value));
    }
}

pub(crate) fn encode_f32<W: BufferWriter>(_width: VectorWidth, data: &[f32], writer: &mut W) {
    for &value in data {
        put(writer, scalar::F32_LEN, |span| scalar::write_f32(span, value));
    }
}

pub(crate) fn encode_f64<W: BufferWriter>(_width: VectorWidth, data: &[f64], writer: &mut W) {
    for &value in data {
        put(writer, scalar::F64_LEN, |span| scalar::write_f64(span, value));
    }
}

pub(crate) fn encode_bools<W: BufferWriter>(_width: VectorWidth, data: &[bool], writer: &mut W) {
    for &value in data {
        put(writer, 1, |span| scalar::write_bool(span, value));
    }
}

pub(crate) fn decode_bools(
    _width: VectorWidth,
    src: &[u8],
    dst: &mut [bool],
    offset: usize,
) -> Result<(), DecodeError> {
    for (i, (&byte, out)) in src.iter().zip(dst.iter_mut()).enumerate() {
        *out = match byte {
            codes::TRUE => true,
            codes::FALSE => false,
            _ => {
                return Err(DecodeError::InvalidBoolean {
                    byte,
                    position: offset + i,
                });
            }
        };
    }
    Ok(())
}
