//! Scalar encoders that write one MessagePack value into a byte span.
//!
//! Every function returns the number of bytes written. Callers must hand in
//! a span of at least the documented maximum length; these are the same
//! routines the vector kernels fall back to for prefixes and tails, so the
//! two paths cannot disagree on the bytes they produce.

use super::codes::{self, range};

/// Longest encoding of any integer (`0xcf`/`0xd3` + 8 bytes).
pub const MAX_INT_LEN: usize = 9;
/// Encoded size of a float32 (`0xca` + 4 bytes).
pub const F32_LEN: usize = 5;
/// Encoded size of a float64 (`0xcb` + 8 bytes).
pub const F64_LEN: usize = 9;
/// Longest array header (`0xdd` + 4 bytes).
pub const MAX_ARRAY_HEADER_LEN: usize = 5;

/// Writes `value` in its shortest unsigned form.
#[inline]
pub fn write_u64(out: &mut [u8], value: u64) -> usize {
    if value <= range::MAX_FIX_POSITIVE_INT as u64 {
        out[0] = value as u8;
        1
    } else if value <= u8::MAX as u64 {
        out[0] = codes::UINT8;
        out[1] = value as u8;
        2
    } else if value <= u16::MAX as u64 {
        out[0] = codes::UINT16;
        out[1..3].copy_from_slice(&(value as u16).to_be_bytes());
        3
    } else if value <= u32::MAX as u64 {
        out[0] = codes::UINT32;
        out[1..5].copy_from_slice(&(value as u32).to_be_bytes());
        5
    } else {
        out[0] = codes::UINT64;
        out[1..9].copy_from_slice(&value.to_be_bytes());
        9
    }
}

/// Writes `value` in its shortest form.
///
/// Non-negative values take the unsigned encodings, so `200i64` becomes
/// `cc c8` rather than `d1 00 c8`.
#[inline]
pub fn write_i64(out: &mut [u8], value: i64) -> usize {
    if value >= 0 {
        write_u64(out, value as u64)
    } else if value >= range::MIN_FIX_NEGATIVE_INT {
        out[0] = value as u8;
        1
    } else if value >= i8::MIN as i64 {
        out[0] = codes::INT8;
        out[1] = value as u8;
        2
    } else if value >= i16::MIN as i64 {
        out[0] = codes::INT16;
        out[1..3].copy_from_slice(&(value as i16).to_be_bytes());
        3
    } else if value >= i32::MIN as i64 {
        out[0] = codes::INT32;
        out[1..5].copy_from_slice(&(value as i32).to_be_bytes());
        5
    } else {
        out[0] = codes::INT64;
        out[1..9].copy_from_slice(&value.to_be_bytes());
        9
    }
}

/// Number of bytes [`write_i64`] produces for `value`.
#[cfg(test)]
const fn int_len(value: i64) -> usize {
    if value >= 0 {
        uint_len(value as u64)
    } else if value >= range::MIN_FIX_NEGATIVE_INT {
        1
    } else if value >= i8::MIN as i64 {
        2
    } else if value >= i16::MIN as i64 {
        3
    } else if value >= i32::MIN as i64 {
        5
    } else {
        9
    }
}

/// Number of bytes [`write_u64`] produces for `value`.
#[cfg(test)]
const fn uint_len(value: u64) -> usize {
    if value <= range::MAX_FIX_POSITIVE_INT as u64 {
        1
    } else if value <= u8::MAX as u64 {
        2
    } else if value <= u16::MAX as u64 {
        3
    } else if value <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

/// Writes the fixed 5-byte float32 form.
#[inline]
pub fn write_f32(out: &mut [u8], value: f32) -> usize {
    out[0] = codes::FLOAT32;
    out[1..F32_LEN].copy_from_slice(&value.to_bits().to_be_bytes());
    F32_LEN
}

/// Writes the fixed 9-byte float64 form.
#[inline]
pub fn write_f64(out: &mut [u8], value: f64) -> usize {
    out[0] = codes::FLOAT64;
    out[1..F64_LEN].copy_from_slice(&value.to_bits().to_be_bytes());
    F64_LEN
}

#[inline]
pub fn write_bool(out: &mut [u8], value: bool) -> usize {
    out[0] = if value { codes::TRUE } else { codes::FALSE };
    1
}

/// Writes an array header for `count` elements.
#[inline]
pub fn write_array_header(out: &mut [u8], count: u32) -> usize {
    if count as usize <= range::MAX_FIX_ARRAY_COUNT {
        out[0] = codes::MIN_FIX_ARRAY | count as u8;
        1
    } else if count <= u16::MAX as u32 {
        out[0] = codes::ARRAY16;
        out[1..3].copy_from_slice(&(count as u16).to_be_bytes());
        3
    } else {
        out[0] = codes::ARRAY32;
        out[1..5].copy_from_slice(&count.to_be_bytes());
        5
    }
}
