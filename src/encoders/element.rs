//! The array codec front door: [`ArrayElement`] and [`ArrayCodec`].

use crate::core::config::CodecConfig;
use crate::encoders::pipeline::{StagePlan, encode_staged};
use crate::encoders::{DecodeError, Error};
use crate::msgpack::{BufferWriter, MessagePackReader, MessagePackWriter};
use crate::simd::{SimdStrategy, VectorWidth};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A primitive that can be bulk (de)serialized as a MessagePack array.
///
/// Implemented for `bool`, `i8..i64`, `u8..u64`, `f32` and `f64`. The trait
/// is sealed: the vector kernels rely on the exact memory layout of these
/// types.
pub trait ArrayElement: Copy + Default + Send + Sync + sealed::Sealed + 'static {
    /// Type name used in error messages and logs.
    const NAME: &'static str;

    /// Whether vector kernels exist for this type.
    const VECTORIZED: bool;

    /// Writes one element with the canonical scalar encoding.
    fn write_one<W: BufferWriter>(self, writer: &mut MessagePackWriter<W>);

    /// Reads one element.
    fn read_one(reader: &mut MessagePackReader<'_>) -> Result<Self, DecodeError>;

    /// Runs the vector kernel of `width` over whole lane groups.
    #[doc(hidden)]
    fn encode_lanes<W: BufferWriter>(width: VectorWidth, data: &[Self], writer: &mut W);

    /// Reads `count` elements that follow an already consumed array header.
    #[doc(hidden)]
    fn decode_elements(
        reader: &mut MessagePackReader<'_>,
        count: usize,
        _strategy: &SimdStrategy,
    ) -> Result<Vec<Self>, Error> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            reader.check_cancelled()?;
            out.push(Self::read_one(reader)?);
        }
        Ok(out)
    }
}

/// Native bytes of a slice of elements.
#[inline]
pub(crate) fn lane_bytes<T: ArrayElement>(data: &[T]) -> &[u8] {
    // SAFETY: every ArrayElement is a primitive without padding bytes.
    unsafe { std::slice::from_raw_parts(data.as_ptr().cast(), std::mem::size_of_val(data)) }
}

/// Bulk array (de)serializer bound to one [`SimdStrategy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayCodec {
    strategy: SimdStrategy,
}

impl ArrayCodec {
    pub fn new(strategy: SimdStrategy) -> Self {
        Self { strategy }
    }

    /// Codec using the widest vector width the CPU supports.
    pub fn detect() -> Self {
        Self::new(SimdStrategy::detect())
    }

    /// Codec that never vectorizes.
    pub fn scalar() -> Self {
        Self::new(SimdStrategy::scalar())
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(SimdStrategy::from_config(config))
    }

    pub fn strategy(&self) -> &SimdStrategy {
        &self.strategy
    }

    /// Plan the pipeline would use for `data`.
    pub fn plan<T: ArrayElement>(&self, data: &[T]) -> StagePlan {
        let width = if T::VECTORIZED {
            self.strategy.width()
        } else {
            VectorWidth::Scalar
        };
        StagePlan::new(data, width, &self.strategy)
    }

    /// Writes `data` as one MessagePack array.
    ///
    /// Fails only when the writer's cancellation token fires; bytes already
    /// committed stay in the writer.
    ///
    /// # Panics
    ///
    /// Panics if `data` has more than `u32::MAX` elements, the largest
    /// count a MessagePack array header can carry.
    pub fn serialize<T: ArrayElement, W: BufferWriter>(
        &self,
        writer: &mut MessagePackWriter<W>,
        data: &[T],
    ) -> Result<(), Error> {
        let count = u32::try_from(data.len())
            .unwrap_or_else(|_| panic!("array of {} elements exceeds u32::MAX", data.len()));

        writer.check_cancelled()?;
        writer.write_array_header(count);
        if data.is_empty() {
            return Ok(());
        }

        let plan = self.plan(data);
        tracing::trace!(
            element = T::NAME,
            len = data.len(),
            width = %plan.width,
            prefix = plan.prefix,
            body = plan.body,
            tail = plan.tail,
            "encoding array"
        );

        encode_staged(
            data,
            &plan,
            &self.strategy,
            writer,
            |width, lanes, w| T::encode_lanes(width, lanes, w),
            |value, w| value.write_one(w),
        )
    }

    /// Reads one MessagePack array of `T`.
    pub fn deserialize<T: ArrayElement>(
        &self,
        reader: &mut MessagePackReader<'_>,
    ) -> Result<Vec<T>, Error> {
        reader.check_cancelled()?;
        let count = reader.read_array_header()?;
        tracing::trace!(element = T::NAME, count, "decoding array");
        T::decode_elements(reader, count, &self.strategy)
    }

    /// Writes `nil` for `None`, otherwise the array.
    pub fn serialize_nullable<T: ArrayElement, W: BufferWriter>(
        &self,
        writer: &mut MessagePackWriter<W>,
        data: Option<&[T]>,
    ) -> Result<(), Error> {
        match data {
            Some(data) => self.serialize(writer, data),
            None => {
                writer.check_cancelled()?;
                writer.write_nil();
                Ok(())
            }
        }
    }

    /// Reads `nil` as `None`, otherwise an array.
    pub fn deserialize_nullable<T: ArrayElement>(
        &self,
        reader: &mut MessagePackReader<'_>,
    ) -> Result<Option<Vec<T>>, Error> {
        if reader.try_read_nil() {
            return Ok(None);
        }
        self.deserialize(reader).map(Some)
    }
}

/// Encodes `data` into a fresh buffer with the detected strategy.
pub fn encode_array<T: ArrayElement>(data: &[T]) -> Vec<u8> {
    let mut writer = MessagePackWriter::in_memory();
    ArrayCodec::detect()
        .serialize(&mut writer, data)
        .unwrap_or_else(|_| unreachable!("in-memory writer has no cancellation token"));
    writer.into_vec()
}

/// Decodes a single array from the front of `bytes`.
pub fn decode_array<T: ArrayElement>(bytes: &[u8]) -> Result<Vec<T>, Error> {
    ArrayCodec::detect().deserialize(&mut MessagePackReader::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cancel::CancellationToken;
    use crate::msgpack::VecWriter;

    #[test]
    fn test_empty_array() {
        assert_eq!(encode_array::<i32>(&[]), vec![0x90]);
        assert_eq!(decode_array::<i32>(&[0x90]).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_nullable_round_trip() {
        let codec = ArrayCodec::detect();
        let mut writer = MessagePackWriter::new(VecWriter::new());
        codec.serialize_nullable::<u16, _>(&mut writer, None).unwrap();
        codec
            .serialize_nullable(&mut writer, Some(&[1u16, 300][..]))
            .unwrap();
        let bytes = writer.into_vec();
        assert_eq!(bytes, vec![0xc0, 0x92, 0x01, 0xcd, 0x01, 0x2c]);

        let mut reader = MessagePackReader::new(&bytes);
        assert_eq!(codec.deserialize_nullable::<u16>(&mut reader).unwrap(), None);
        assert_eq!(
            codec.deserialize_nullable::<u16>(&mut reader).unwrap(),
            Some(vec![1, 300])
        );
        assert!(reader.is_end());
    }

    #[test]
    fn test_plan_is_scalar_for_64_bit_integers() {
        let data = vec![0i64; 256];
        let plan = ArrayCodec::detect().plan(&data);
        assert_eq!(plan, StagePlan::scalar(256));
    }

    fn cancellable_reader(bytes: &[u8]) -> (MessagePackReader<'_>, CancellationToken) {
        let token = CancellationToken::new();
        (
            MessagePackReader::with_cancellation(bytes, token.clone()),
            token,
        )
    }

    #[test]
    fn test_cancel_after_header_stops_integer_decode() {
        let data: Vec<i32> = (0..10_000).map(|i| i * 37 - 150_000).collect();
        let bytes = encode_array(&data);
        let (mut reader, token) = cancellable_reader(&bytes);

        let count = reader.read_array_header().unwrap();
        assert_eq!(count, 10_000);
        let body_start = reader.position();
        token.cancel();

        let result = i32::decode_elements(&mut reader, count, &SimdStrategy::detect());
        assert_eq!(result, Err(Error::Cancelled));
        assert_eq!(reader.position(), body_start);
    }

    #[test]
    fn test_cancel_partway_through_float_decode() {
        let data: Vec<f64> = (0..10_000).map(|i| i as f64 * 0.5).collect();
        let bytes = encode_array(&data);
        let (mut reader, token) = cancellable_reader(&bytes);

        let count = reader.read_array_header().unwrap();
        for _ in 0..4_000 {
            f64::read_one(&mut reader).unwrap();
        }
        let stopped_at = reader.position();
        token.cancel();

        let result = f64::decode_elements(&mut reader, count - 4_000, &SimdStrategy::detect());
        assert_eq!(result, Err(Error::Cancelled));
        assert_eq!(reader.position(), stopped_at);
        assert!(reader.position() < bytes.len());
    }

    #[test]
    fn test_cancel_partway_through_integer_decode() {
        let data: Vec<u16> = (0..10_000u32).map(|i| (i * 7) as u16).collect();
        let bytes = encode_array(&data);
        let (mut reader, token) = cancellable_reader(&bytes);

        let count = reader.read_array_header().unwrap();
        let head = u16::decode_elements(&mut reader, 2_500, &SimdStrategy::detect()).unwrap();
        assert_eq!(head, data[..2_500]);
        let stopped_at = reader.position();
        token.cancel();

        let result = u16::decode_elements(&mut reader, count - 2_500, &SimdStrategy::detect());
        assert_eq!(result, Err(Error::Cancelled));
        assert_eq!(reader.position(), stopped_at);
        assert!(stopped_at < bytes.len());
    }

    #[test]
    fn test_cancel_after_header_stops_bool_decode() {
        let data: Vec<bool> = (0..10_000).map(|i| i % 3 == 0).collect();
        let bytes = encode_array(&data);

        for strategy in [SimdStrategy::detect(), SimdStrategy::scalar()] {
            let (mut reader, token) = cancellable_reader(&bytes);
            let count = reader.read_array_header().unwrap();
            token.cancel();

            let result = bool::decode_elements(&mut reader, count, &strategy);
            assert_eq!(result, Err(Error::Cancelled), "width {}", strategy.width());
        }
    }

    #[test]
    fn test_header_forms() {
        assert_eq!(&encode_array(&[0u8; 15])[..1], &[0x9f]);
        assert_eq!(&encode_array(&[0u8; 16])[..3], &[0xdc, 0x00, 0x10]);
        assert_eq!(
            &encode_array(&vec![0u8; 70_000])[..5],
            &[0xdd, 0x00, 0x01, 0x11, 0x70]
        );
    }
}
