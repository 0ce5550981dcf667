//! Boolean array codec.
//!
//! Each element is exactly one byte on the wire (`c2`/`c3`), so decoding
//! reads the whole payload with one `read_raw` and validates it in bulk.
//! Vector and scalar paths apply the same rule: any byte other than `c2`
//! or `c3` is an `InvalidBoolean` naming that byte and its offset.

use std::mem::size_of;

use crate::encoders::element::{ArrayElement, sealed};
use crate::encoders::pipeline::StagePlan;
use crate::encoders::{DecodeError, Error};
use crate::msgpack::{BufferWriter, MessagePackReader, MessagePackWriter, codes};
use crate::simd::{SimdStrategy, VectorWidth, arch};

/// Scalar form of the validation rule.
#[inline]
fn decode_byte(byte: u8, position: usize) -> Result<bool, DecodeError> {
    match byte {
        codes::TRUE => Ok(true),
        codes::FALSE => Ok(false),
        _ => Err(DecodeError::InvalidBoolean { byte, position }),
    }
}

fn decode_scalar(
    reader: &MessagePackReader<'_>,
    src: &[u8],
    dst: &mut [bool],
    offset: usize,
) -> Result<(), Error> {
    for (i, (&byte, out)) in src.iter().zip(dst.iter_mut()).enumerate() {
        reader.check_cancelled()?;
        *out = decode_byte(byte, offset + i)?;
    }
    Ok(())
}

/// Decodes a boolean payload with the same stage layout as encoding.
fn decode_payload(
    reader: &MessagePackReader<'_>,
    src: &[u8],
    offset: usize,
    strategy: &SimdStrategy,
) -> Result<Vec<bool>, Error> {
    let mut out = vec![false; src.len()];
    let plan = StagePlan::new(src, strategy.width(), strategy);

    let (prefix, rest) = src.split_at(plan.prefix);
    let (body, tail) = rest.split_at(plan.body);
    let (out_prefix, out_rest) = out.split_at_mut(plan.prefix);
    let (out_body, out_tail) = out_rest.split_at_mut(plan.body);

    decode_scalar(reader, prefix, out_prefix, offset)?;

    let mut position = offset + plan.prefix;
    if !body.is_empty() {
        let lanes = plan.width.lanes(size_of::<u8>());
        let chunk = (strategy.poll_elements() / lanes).max(1) * lanes;
        for (part, dst) in body.chunks(chunk).zip(out_body.chunks_mut(chunk)) {
            reader.check_cancelled()?;
            arch::decode_bools(plan.width, part, dst, position)?;
            position += part.len();
        }
    }

    let mut rest = tail;
    let mut rest_out = out_tail;
    for width in plan.width.cascade() {
        let covered = rest.len() / width.bytes() * width.bytes();
        if covered > 0 {
            reader.check_cancelled()?;
            let (dst, remaining) = rest_out.split_at_mut(covered);
            arch::decode_bools(width, &rest[..covered], dst, position)?;
            position += covered;
            rest = &rest[covered..];
            rest_out = remaining;
        }
    }

    decode_scalar(reader, rest, rest_out, position)?;
    Ok(out)
}

impl sealed::Sealed for bool {}

impl ArrayElement for bool {
    const NAME: &'static str = "bool";
    const VECTORIZED: bool = true;

    #[inline]
    fn write_one<W: BufferWriter>(self, writer: &mut MessagePackWriter<W>) {
        writer.write_bool(self);
    }

    #[inline]
    fn read_one(reader: &mut MessagePackReader<'_>) -> Result<Self, DecodeError> {
        reader.read_bool()
    }

    fn encode_lanes<W: BufferWriter>(width: VectorWidth, data: &[Self], writer: &mut W) {
        arch::encode_bools(width, data, writer);
    }

    fn decode_elements(
        reader: &mut MessagePackReader<'_>,
        count: usize,
        strategy: &SimdStrategy,
    ) -> Result<Vec<Self>, Error> {
        let offset = reader.position();
        let src = reader.read_raw(count)?;
        decode_payload(reader, src, offset, strategy)
    }
}
