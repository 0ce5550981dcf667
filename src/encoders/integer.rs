//! Integer array codec.
//!
//! 8, 16 and 32-bit integers go through the shuffle-table kernels; 64-bit
//! integers have no vector path and are always written scalar. Decoding is
//! scalar for every width: any MessagePack integer code is accepted and a
//! value that does not fit the target type is an `Overflow`.

use crate::encoders::DecodeError;
use crate::encoders::element::{ArrayElement, lane_bytes, sealed};
use crate::msgpack::{BufferWriter, MessagePackReader, MessagePackWriter, scalar};
use crate::simd::tables::{IntegerKind, ShuffleTable};
use crate::simd::{VectorWidth, arch};

macro_rules! vector_integer {
    ($ty:ty, $kind:expr, $write:ident) => {
        impl sealed::Sealed for $ty {}

        impl ArrayElement for $ty {
            const NAME: &'static str = stringify!($ty);
            const VECTORIZED: bool = true;

            #[inline]
            fn write_one<W: BufferWriter>(self, writer: &mut MessagePackWriter<W>) {
                writer.$write(self);
            }

            #[inline]
            fn read_one(reader: &mut MessagePackReader<'_>) -> Result<Self, DecodeError> {
                reader.read_int::<$ty>(stringify!($ty))
            }

            fn encode_lanes<W: BufferWriter>(width: VectorWidth, data: &[Self], writer: &mut W) {
                let table = ShuffleTable::get($kind)
                    .unwrap_or_else(|| unreachable!("{} has a shuffle table", stringify!($ty)));
                arch::encode_integers(width, table, lane_bytes(data), writer);
            }
        }
    };
}

vector_integer!(i8, IntegerKind::I8, write_i8);
vector_integer!(u8, IntegerKind::U8, write_u8);
vector_integer!(i16, IntegerKind::I16, write_i16);
vector_integer!(u16, IntegerKind::U16, write_u16);
vector_integer!(i32, IntegerKind::I32, write_i32);
vector_integer!(u32, IntegerKind::U32, write_u32);

macro_rules! scalar_integer {
    ($ty:ty, $write:ident, $encode:ident) => {
        impl sealed::Sealed for $ty {}

        impl ArrayElement for $ty {
            const NAME: &'static str = stringify!($ty);
            const VECTORIZED: bool = false;

            #[inline]
            fn write_one<W: BufferWriter>(self, writer: &mut MessagePackWriter<W>) {
                writer.$write(self);
            }

            #[inline]
            fn read_one(reader: &mut MessagePackReader<'_>) -> Result<Self, DecodeError> {
                reader.read_int::<$ty>(stringify!($ty))
            }

            fn encode_lanes<W: BufferWriter>(_width: VectorWidth, data: &[Self], writer: &mut W) {
                for &value in data {
                    let span = writer.get_span(scalar::MAX_INT_LEN);
                    let written = scalar::$encode(span, value);
                    writer.advance(written);
                }
            }
        }
    };
}

scalar_integer!(i64, write_i64, write_i64);
scalar_integer!(u64, write_u64, write_u64);
