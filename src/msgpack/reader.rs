//! Input side of the codec: a cursor over an in-memory MessagePack payload.

use num_traits::NumCast;

use super::codes;
use crate::core::cancel::CancellationToken;
use crate::encoders::{DecodeError, Error};

/// An integer as read from the wire, before narrowing to a target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integer {
    Signed(i64),
    Unsigned(u64),
}

impl Integer {
    /// Converts to `T`, or `None` when the value is out of range.
    pub fn cast<T: NumCast>(self) -> Option<T> {
        match self {
            Integer::Signed(v) => <T as NumCast>::from(v),
            Integer::Unsigned(v) => <T as NumCast>::from(v),
        }
    }

    pub fn as_i128(self) -> i128 {
        match self {
            Integer::Signed(v) => v as i128,
            Integer::Unsigned(v) => v as i128,
        }
    }
}

/// MessagePack primitive reader over a byte slice.
#[derive(Debug, Clone)]
pub struct MessagePackReader<'a> {
    data: &'a [u8],
    pos: usize,
    cancellation: Option<CancellationToken>,
}

impl<'a> MessagePackReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            cancellation: None,
        }
    }

    pub fn with_cancellation(data: &'a [u8], token: CancellationToken) -> Self {
        Self {
            data,
            pos: 0,
            cancellation: Some(token),
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    pub fn check_cancelled(&self) -> Result<(), Error> {
        match &self.cancellation {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    /// Returns the next code without consuming it.
    #[inline]
    pub fn peek_code(&self) -> Result<u8, DecodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::eof(self.pos, 1))
    }

    #[inline]
    fn read_code(&mut self) -> Result<u8, DecodeError> {
        let code = self.peek_code()?;
        self.pos += 1;
        Ok(code)
    }

    /// Consumes and returns the next `count` bytes.
    #[inline]
    pub fn read_raw(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if remaining < count {
            return Err(DecodeError::eof(self.pos, count - remaining));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_raw(N)?);
        Ok(out)
    }

    /// Reads an array header and returns the element count.
    ///
    /// Every element takes at least one byte, so a count larger than the
    /// remaining input is rejected before anyone allocates for it.
    pub fn read_array_header(&mut self) -> Result<usize, DecodeError> {
        let start = self.pos;
        let code = self.read_code()?;
        let count = match code {
            codes::MIN_FIX_ARRAY..=codes::MAX_FIX_ARRAY => (code & 0x0f) as usize,
            codes::ARRAY16 => u16::from_be_bytes(self.read_array()?) as usize,
            codes::ARRAY32 => u32::from_be_bytes(self.read_array()?) as usize,
            _ => {
                self.pos = start;
                return Err(DecodeError::invalid_code(code, start, "array"));
            }
        };
        if count > self.remaining() {
            return Err(DecodeError::LengthOverrun {
                declared: count,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Consumes a `nil` if one is next.
    pub fn try_read_nil(&mut self) -> bool {
        if self.data.get(self.pos) == Some(&codes::NIL) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn read_nil(&mut self) -> Result<(), DecodeError> {
        let start = self.pos;
        match self.read_code()? {
            codes::NIL => Ok(()),
            code => {
                self.pos = start;
                Err(DecodeError::invalid_code(code, start, "nil"))
            }
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let start = self.pos;
        match self.read_code()? {
            codes::TRUE => Ok(true),
            codes::FALSE => Ok(false),
            code => {
                self.pos = start;
                Err(DecodeError::invalid_code(code, start, "bool"))
            }
        }
    }

    /// Reads any integer encoding.
    pub fn read_integer(&mut self) -> Result<Integer, DecodeError> {
        let start = self.pos;
        let code = self.read_code()?;
        let value = match code {
            codes::MIN_FIX_INT..=codes::MAX_FIX_INT => Integer::Unsigned(code as u64),
            codes::MIN_NEGATIVE_FIX_INT..=codes::MAX_NEGATIVE_FIX_INT => {
                Integer::Signed(code as i8 as i64)
            }
            codes::UINT8 => Integer::Unsigned(self.read_array::<1>()?[0] as u64),
            codes::UINT16 => Integer::Unsigned(u16::from_be_bytes(self.read_array()?) as u64),
            codes::UINT32 => Integer::Unsigned(u32::from_be_bytes(self.read_array()?) as u64),
            codes::UINT64 => Integer::Unsigned(u64::from_be_bytes(self.read_array()?)),
            codes::INT8 => Integer::Signed(self.read_array::<1>()?[0] as i8 as i64),
            codes::INT16 => Integer::Signed(i16::from_be_bytes(self.read_array()?) as i64),
            codes::INT32 => Integer::Signed(i32::from_be_bytes(self.read_array()?) as i64),
            codes::INT64 => Integer::Signed(i64::from_be_bytes(self.read_array()?)),
            _ => {
                self.pos = start;
                return Err(DecodeError::invalid_code(code, start, "integer"));
            }
        };
        Ok(value)
    }

    /// Reads an integer and narrows it to `T`.
    pub fn read_int<T: NumCast>(&mut self, target: &'static str) -> Result<T, DecodeError> {
        let start = self.pos;
        let value = self.read_integer()?;
        value.cast().ok_or(DecodeError::Overflow {
            value: value.as_i128(),
            target,
            position: start,
        })
    }

    /// Reads a float32, widening rules included: float64 is narrowed and
    /// integers are converted.
    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        let start = self.pos;
        match self.peek_code()? {
            codes::FLOAT32 => {
                self.pos += 1;
                Ok(f32::from_bits(u32::from_be_bytes(self.read_array()?)))
            }
            codes::FLOAT64 => {
                self.pos += 1;
                Ok(f64::from_bits(u64::from_be_bytes(self.read_array()?)) as f32)
            }
            code if codes::is_integer(code) => Ok(match self.read_integer()? {
                Integer::Signed(v) => v as f32,
                Integer::Unsigned(v) => v as f32,
            }),
            code => Err(DecodeError::invalid_code(code, start, "float")),
        }
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        let start = self.pos;
        match self.peek_code()? {
            codes::FLOAT32 => {
                self.pos += 1;
                Ok(f32::from_bits(u32::from_be_bytes(self.read_array()?)) as f64)
            }
            codes::FLOAT64 => {
                self.pos += 1;
                Ok(f64::from_bits(u64::from_be_bytes(self.read_array()?)))
            }
            code if codes::is_integer(code) => Ok(match self.read_integer()? {
                Integer::Signed(v) => v as f64,
                Integer::Unsigned(v) => v as f64,
            }),
            code => Err(DecodeError::invalid_code(code, start, "float")),
        }
    }

    /// Skips one complete value, including nested arrays and maps.
    pub fn skip(&mut self) -> Result<(), DecodeError> {
        let mut pending: u64 = 1;
        while pending > 0 {
            pending -= 1;
            let start = self.pos;
            let code = self.read_code()?;
            let (payload, children) = match code {
                codes::MIN_FIX_INT..=codes::MAX_FIX_INT
                | codes::MIN_NEGATIVE_FIX_INT..=codes::MAX_NEGATIVE_FIX_INT
                | codes::NIL
                | codes::FALSE
                | codes::TRUE => (0, 0),
                codes::MIN_FIX_MAP..=codes::MAX_FIX_MAP => (0, 2 * (code & 0x0f) as u64),
                codes::MIN_FIX_ARRAY..=codes::MAX_FIX_ARRAY => (0, (code & 0x0f) as u64),
                codes::MIN_FIX_STR..=codes::MAX_FIX_STR => ((code & 0x1f) as usize, 0),
                codes::UINT8 | codes::INT8 => (1, 0),
                codes::UINT16 | codes::INT16 => (2, 0),
                codes::UINT32 | codes::INT32 | codes::FLOAT32 => (4, 0),
                codes::UINT64 | codes::INT64 | codes::FLOAT64 => (8, 0),
                codes::FIX_EXT1 => (2, 0),
                codes::FIX_EXT2 => (3, 0),
                codes::FIX_EXT4 => (5, 0),
                codes::FIX_EXT8 => (9, 0),
                codes::FIX_EXT16 => (17, 0),
                codes::STR8 | codes::BIN8 => (self.read_array::<1>()?[0] as usize, 0),
                codes::STR16 | codes::BIN16 => (u16::from_be_bytes(self.read_array()?) as usize, 0),
                codes::STR32 | codes::BIN32 => (u32::from_be_bytes(self.read_array()?) as usize, 0),
                codes::EXT8 => (self.read_array::<1>()?[0] as usize + 1, 0),
                codes::EXT16 => (u16::from_be_bytes(self.read_array()?) as usize + 1, 0),
                codes::EXT32 => (u32::from_be_bytes(self.read_array()?) as usize + 1, 0),
                codes::ARRAY16 => (0, u16::from_be_bytes(self.read_array()?) as u64),
                codes::ARRAY32 => (0, u32::from_be_bytes(self.read_array()?) as u64),
                codes::MAP16 => (0, 2 * u16::from_be_bytes(self.read_array()?) as u64),
                codes::MAP32 => (0, 2 * u32::from_be_bytes(self.read_array()?) as u64),
                codes::NEVER_USED => {
                    self.pos = start;
                    return Err(DecodeError::invalid_code(code, start, "any value"));
                }
            };
            self.read_raw(payload)?;
            pending += children;
        }
        Ok(())
    }
}
