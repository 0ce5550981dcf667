//! Cooperative cancellation during long encodes and decodes.

use msgpack_d::prelude::*;
use msgpack_d::{BufferWriter, VecWriter};

/// Cancels its token once `limit` bytes have been committed.
struct TrippingWriter {
    inner: VecWriter,
    token: CancellationToken,
    limit: usize,
}

impl BufferWriter for TrippingWriter {
    fn get_span(&mut self, min_len: usize) -> &mut [u8] {
        self.inner.get_span(min_len)
    }

    fn advance(&mut self, count: usize) {
        self.inner.advance(count);
        if self.inner.len() >= self.limit {
            self.token.cancel();
        }
    }
}

fn encode_until_cancelled<T: ArrayElement>(
    codec: &ArrayCodec,
    data: &[T],
    limit: usize,
) -> (Result<(), Error>, Vec<u8>) {
    let token = CancellationToken::new();
    let sink = TrippingWriter {
        inner: VecWriter::new(),
        token: token.clone(),
        limit,
    };
    let mut writer = MessagePackWriter::with_cancellation(sink, token);
    let result = codec.serialize(&mut writer, data);
    (result, writer.into_inner().inner.into_vec())
}

#[test]
fn test_cancel_mid_vector_body() {
    let data: Vec<i32> = msgpack_d::bench::mixed_integers(10_000, 5);
    let full = encode_array(&data);
    let codec = ArrayCodec::new(SimdStrategy::detect().poll_interval(256));

    let (result, partial) = encode_until_cancelled(&codec, &data, 1000);
    assert_eq!(result, Err(Error::Cancelled));
    assert!(partial.len() >= 1000);
    assert!(partial.len() < full.len());
    // Whatever was committed is a valid prefix of the full encoding.
    assert_eq!(&full[..partial.len()], &partial[..]);
}

#[test]
fn test_cancel_scalar_path() {
    let data = vec![-1_000_000i64; 10_000];
    let full = encode_array(&data);

    let (result, partial) = encode_until_cancelled(&ArrayCodec::scalar(), &data, 500);
    assert_eq!(result, Err(Error::Cancelled));
    // Scalar elements are checked one at a time: the encode stops at the
    // first element boundary past the limit.
    assert!(partial.len() < 500 + 9);
    assert_eq!(&full[..partial.len()], &partial[..]);
}

#[test]
fn test_cancel_float_and_bool_arrays() {
    let floats = msgpack_d::bench::random_f64(10_000, 8);
    let (result, partial) = encode_until_cancelled(&ArrayCodec::detect(), &floats, 2048);
    assert_eq!(result, Err(Error::Cancelled));
    assert!(partial.len() < encode_array(&floats).len());

    let bools = msgpack_d::bench::random_bools(10_000, 9);
    let (result, partial) = encode_until_cancelled(&ArrayCodec::detect(), &bools, 2048);
    assert_eq!(result, Err(Error::Cancelled));
    assert!(partial.len() < encode_array(&bools).len());
}

#[test]
fn test_already_cancelled_writes_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let mut writer = MessagePackWriter::with_cancellation(VecWriter::new(), token);
    let result = ArrayCodec::detect().serialize(&mut writer, &[1u8, 2, 3]);
    assert_eq!(result, Err(Error::Cancelled));
    assert!(writer.into_inner().is_empty());
}

#[test]
fn test_already_cancelled_decode() {
    let bytes = encode_array(&vec![7u16; 10_000]);
    let token = CancellationToken::new();
    token.cancel();

    let mut reader = MessagePackReader::with_cancellation(&bytes, token.clone());
    assert_eq!(
        ArrayCodec::detect().deserialize::<u16>(&mut reader),
        Err(Error::Cancelled)
    );

    let bools = encode_array(&vec![true; 10_000]);
    let mut reader = MessagePackReader::with_cancellation(&bools, token);
    assert_eq!(
        ArrayCodec::detect().deserialize::<bool>(&mut reader),
        Err(Error::Cancelled)
    );
}

#[test]
fn test_cancel_between_header_and_payload() {
    let data: Vec<i16> = msgpack_d::bench::mixed_integers(10_000, 11);
    let bytes = encode_array(&data);
    let strategy = SimdStrategy::detect();

    let token = CancellationToken::new();
    let mut reader = MessagePackReader::with_cancellation(&bytes, token.clone());
    let count = reader.read_array_header().unwrap();
    let head = i16::decode_elements(&mut reader, 1_000, &strategy).unwrap();
    assert_eq!(head, data[..1_000]);

    let stopped_at = reader.position();
    token.cancel();
    assert_eq!(
        i16::decode_elements(&mut reader, count - 1_000, &strategy),
        Err(Error::Cancelled)
    );
    assert_eq!(reader.position(), stopped_at);
    assert!(stopped_at < bytes.len());

    let bools = encode_array(&vec![false; 10_000]);
    let token = CancellationToken::new();
    let mut reader = MessagePackReader::with_cancellation(&bools, token.clone());
    let count = reader.read_array_header().unwrap();
    token.cancel();
    assert_eq!(
        bool::decode_elements(&mut reader, count, &strategy),
        Err(Error::Cancelled)
    );
}

#[test]
fn test_uncancelled_token_completes() {
    let data: Vec<u32> = msgpack_d::bench::mixed_integers(10_000, 6);
    let token = CancellationToken::new();
    let mut writer = MessagePackWriter::with_cancellation(VecWriter::new(), token);
    ArrayCodec::detect().serialize(&mut writer, &data).unwrap();
    assert_eq!(writer.into_inner().into_vec(), encode_array(&data));
}
