//! Convenient re-exports for common usage.
//!
//! This module provides a single import for the types most callers need.
//!
//! # Example
//!
//! ```
//! use msgpack_d::prelude::*;
//!
//! let codec = ArrayCodec::detect();
//! let mut writer = MessagePackWriter::in_memory();
//! codec.serialize(&mut writer, &[true, false, true]).unwrap();
//!
//! let bytes = writer.into_vec();
//! let mut reader = MessagePackReader::new(&bytes);
//! assert_eq!(codec.deserialize::<bool>(&mut reader).unwrap(), vec![true, false, true]);
//! ```

pub use crate::{
    // Codec
    ArrayCodec,
    ArrayElement,
    // Cancellation
    CancellationToken,
    // Config
    CodecConfig,
    DecodeError,
    Error,

    // Wire layer
    MessagePackReader,
    MessagePackWriter,
    SimdPolicy,
    SimdStrategy,
    VectorWidth,

    decode_array,
    encode_array,
};
