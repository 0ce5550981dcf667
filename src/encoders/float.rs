//! Floating-point array codec.
//!
//! `f32` elements are always written as float32 (`ca`) and `f64` as
//! float64 (`cb`), big-endian, so the output size is fixed at N×5 or N×9
//! bytes after the header. Decoding accepts float32, float64 and integer
//! codes.

use crate::encoders::DecodeError;
use crate::encoders::element::{ArrayElement, sealed};
use crate::msgpack::{BufferWriter, MessagePackReader, MessagePackWriter};
use crate::simd::{VectorWidth, arch};

impl sealed::Sealed for f32 {}

impl ArrayElement for f32 {
    const NAME: &'static str = "f32";
    const VECTORIZED: bool = true;

    #[inline]
    fn write_one<W: BufferWriter>(self, writer: &mut MessagePackWriter<W>) {
        writer.write_f32(self);
    }

    #[inline]
    fn read_one(reader: &mut MessagePackReader<'_>) -> Result<Self, DecodeError> {
        reader.read_f32()
    }

    fn encode_lanes<W: BufferWriter>(width: VectorWidth, data: &[Self], writer: &mut W) {
        arch::encode_f32(width, data, writer);
    }
}

impl sealed::Sealed for f64 {}

impl ArrayElement for f64 {
    const NAME: &'static str = "f64";
    const VECTORIZED: bool = true;

    #[inline]
    fn write_one<W: BufferWriter>(self, writer: &mut MessagePackWriter<W>) {
        writer.write_f64(self);
    }

    #[inline]
    fn read_one(reader: &mut MessagePackReader<'_>) -> Result<Self, DecodeError> {
        reader.read_f64()
    }

    fn encode_lanes<W: BufferWriter>(width: VectorWidth, data: &[Self], writer: &mut W) {
        arch::encode_f64(width, data, writer);
    }
}
