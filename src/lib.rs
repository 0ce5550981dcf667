//! SIMD-accelerated MessagePack codec for arrays of primitives.
//!
//! Arrays of `bool`, `i8..i64`, `u8..u64`, `f32` and `f64` are written with
//! vector kernels (SSSE3, AVX2, AVX-512 or NEON, picked at runtime) and
//! produce exactly the bytes a scalar MessagePack writer would: the
//! smallest integer encoding per element, `float32`/`float64` for floats.
//!
//! ```
//! use msgpack_d::{decode_array, encode_array};
//!
//! let bytes = encode_array(&[1i32, -100, 70_000]);
//! assert_eq!(bytes[0], 0x93);
//! assert_eq!(decode_array::<i32>(&bytes).unwrap(), vec![1, -100, 70_000]);
//! ```

mod core;
mod encoders;

pub mod bench;
pub mod msgpack;
pub mod prelude;
pub mod simd;

pub use crate::core::cancel::CancellationToken;
pub use crate::core::config::{
    CancellationSettings, CodecConfig, ConfigError, SimdPolicy, SimdSettings,
};
pub use encoders::{
    ArrayCodec, ArrayElement, DecodeError, Error, Stage, StagePlan, decode_array, encode_array,
};
pub use msgpack::{BufferWriter, MessagePackReader, MessagePackWriter, VecWriter};
pub use simd::{SimdStrategy, VectorWidth, detected_width};
