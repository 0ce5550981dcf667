//! Output side of the codec: a span-granting buffer and the MessagePack
//! primitive writer built on top of it.

use super::scalar;
use crate::core::cancel::CancellationToken;
use crate::encoders::Error;

/// A destination that hands out writable spans on request.
///
/// The protocol is strictly sequential: call [`get_span`](Self::get_span),
/// write into the prefix of the returned slice, then [`advance`](Self::advance)
/// by exactly the number of bytes written before asking for the next span.
pub trait BufferWriter {
    /// Returns a span of at least `min_len` contiguous writable bytes.
    fn get_span(&mut self, min_len: usize) -> &mut [u8];

    /// Commits `count` bytes of the most recently granted span.
    fn advance(&mut self, count: usize);
}

/// Growable in-memory [`BufferWriter`].
#[derive(Debug, Default, Clone)]
pub struct VecWriter {
    buf: Vec<u8>,
    written: usize,
}

impl VecWriter {
    const MIN_GROWTH: usize = 256;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            written: 0,
        }
    }

    /// Bytes committed so far.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.written]
    }

    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.written);
        self.buf
    }
}

impl BufferWriter for VecWriter {
    fn get_span(&mut self, min_len: usize) -> &mut [u8] {
        let needed = self.written + min_len;
        if self.buf.len() < needed {
            let grow_to = needed.max(self.written + Self::MIN_GROWTH).max(self.buf.len() * 2);
            self.buf.resize(grow_to, 0);
        }
        &mut self.buf[self.written..]
    }

    fn advance(&mut self, count: usize) {
        assert!(
            self.written + count <= self.buf.len(),
            "advance past the granted span"
        );
        self.written += count;
    }
}

impl<T: BufferWriter + ?Sized> BufferWriter for &mut T {
    #[inline]
    fn get_span(&mut self, min_len: usize) -> &mut [u8] {
        (**self).get_span(min_len)
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        (**self).advance(count)
    }
}

/// MessagePack primitive writer.
pub struct MessagePackWriter<W: BufferWriter> {
    inner: W,
    cancellation: Option<CancellationToken>,
}

impl<W: BufferWriter> MessagePackWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            cancellation: None,
        }
    }

    pub fn with_cancellation(inner: W, token: CancellationToken) -> Self {
        Self {
            inner,
            cancellation: Some(token),
        }
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Polls the cancellation token, if any.
    #[inline]
    pub fn check_cancelled(&self) -> Result<(), Error> {
        match &self.cancellation {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Runs a scalar encoder against a span of `max_len` bytes and commits
    /// what it wrote.
    #[inline]
    fn put(&mut self, max_len: usize, encode: impl FnOnce(&mut [u8]) -> usize) {
        let span = self.inner.get_span(max_len);
        let written = encode(span);
        self.inner.advance(written);
    }

    pub fn write_array_header(&mut self, count: u32) {
        self.put(scalar::MAX_ARRAY_HEADER_LEN, |span| {
            scalar::write_array_header(span, count)
        });
    }

    pub fn write_nil(&mut self) {
        self.put(1, |span| {
            span[0] = super::codes::NIL;
            1
        });
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.put(1, |span| scalar::write_bool(span, value));
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.put(scalar::MAX_INT_LEN, |span| scalar::write_i64(span, value));
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.put(scalar::MAX_INT_LEN, |span| scalar::write_u64(span, value));
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.write_i64(value as i64);
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        self.write_i64(value as i64);
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.write_i64(value as i64);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.write_u64(value as u64);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.write_u64(value as u64);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.write_u64(value as u64);
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.put(scalar::F32_LEN, |span| scalar::write_f32(span, value));
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.put(scalar::F64_LEN, |span| scalar::write_f64(span, value));
    }

    /// Copies already-encoded bytes through unchanged.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        let span = self.inner.get_span(bytes.len());
        span[..bytes.len()].copy_from_slice(bytes);
        self.inner.advance(bytes.len());
    }
}

impl<W: BufferWriter> BufferWriter for MessagePackWriter<W> {
    #[inline]
    fn get_span(&mut self, min_len: usize) -> &mut [u8] {
        self.inner.get_span(min_len)
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        self.inner.advance(count)
    }
}

impl MessagePackWriter<VecWriter> {
    /// Writer over a fresh [`VecWriter`].
    pub fn in_memory() -> Self {
        Self::new(VecWriter::new())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.inner.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_writer_span_protocol() {
        let mut writer = VecWriter::new();
        let span = writer.get_span(3);
        assert!(span.len() >= 3);
        span[..3].copy_from_slice(&[1, 2, 3]);
        writer.advance(2);
        assert_eq!(writer.written(), &[1, 2]);

        let span = writer.get_span(1000);
        assert!(span.len() >= 1000);
        span[0] = 9;
        writer.advance(1);
        assert_eq!(writer.into_vec(), vec![1, 2, 9]);
    }

    #[test]
    #[should_panic(expected = "advance past the granted span")]
    fn test_advance_past_span_panics() {
        let mut writer = VecWriter::new();
        let granted = writer.get_span(1).len();
        writer.advance(granted + 1);
    }

    #[test]
    fn test_primitive_writes() {
        let mut writer = MessagePackWriter::in_memory();
        writer.write_array_header(3);
        writer.write_i32(-1);
        writer.write_u16(300);
        writer.write_bool(true);
        writer.write_nil();
        assert_eq!(
            writer.into_vec(),
            vec![0x93, 0xff, 0xcd, 0x01, 0x2c, 0xc3, 0xc0]
        );
    }

    #[test]
    fn test_cancellation_poll() {
        let token = CancellationToken::new();
        let writer = MessagePackWriter::with_cancellation(VecWriter::new(), token.clone());
        assert!(writer.check_cancelled().is_ok());
        token.cancel();
        assert_eq!(writer.check_cancelled(), Err(Error::Cancelled));
    }
}
