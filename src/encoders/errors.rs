use thiserror::Error;

use crate::msgpack::codes;

/// Errors that can occur while decoding MessagePack input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ended before a complete value could be read
    #[error("unexpected end of input at offset {position}: {needed} more byte(s) required")]
    UnexpectedEof { position: usize, needed: usize },

    /// A type code that is not legal for the value being read
    #[error("unexpected code 0x{code:02x} ({format}) at offset {position}, expected {expected}")]
    InvalidCode {
        code: u8,
        format: &'static str,
        expected: &'static str,
        position: usize,
    },

    /// An integer that does not fit the requested element type
    #[error("integer {value} at offset {position} does not fit in {target}")]
    Overflow {
        value: i128,
        target: &'static str,
        position: usize,
    },

    /// A byte inside a boolean array payload that is neither `0xc2` nor `0xc3`
    #[error("invalid boolean code 0x{byte:02x} at offset {position}")]
    InvalidBoolean { byte: u8, position: usize },

    /// An array header that announces more elements than bytes remain
    #[error("array header declares {declared} element(s) but only {remaining} byte(s) remain")]
    LengthOverrun { declared: usize, remaining: usize },
}

impl DecodeError {
    /// Create an InvalidCode error for `code` found at `position`
    pub fn invalid_code(code: u8, position: usize, expected: &'static str) -> Self {
        DecodeError::InvalidCode {
            code,
            format: codes::format_name(code),
            expected,
            position,
        }
    }

    /// Create an UnexpectedEof error
    pub fn eof(position: usize, needed: usize) -> Self {
        DecodeError::UnexpectedEof { position, needed }
    }

    /// Offset in the input where the error was detected, if known.
    pub fn position(&self) -> Option<usize> {
        match self {
            DecodeError::UnexpectedEof { position, .. }
            | DecodeError::InvalidCode { position, .. }
            | DecodeError::Overflow { position, .. }
            | DecodeError::InvalidBoolean { position, .. } => Some(*position),
            DecodeError::LengthOverrun { .. } => None,
        }
    }
}

/// Top-level error of an array (de)serialization call.
///
/// Cancellation is kept apart from malformed input so callers can tell an
/// aborted call from a corrupt payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
