//! Stage pipeline shared by the array codecs.
//!
//! An array is processed in three stages:
//!
//! ```text
//! UnalignedPrefix -> VectorizedBody -> ScalarTail -> Done
//! ```
//!
//! The prefix is encoded scalar until the remaining slice starts on the
//! vector width's boundary. The body covers whole lane groups and runs in
//! chunks of the strategy's poll interval, with a cancellation check
//! between chunks. The tail is offered to each narrower width in turn and
//! whatever is left is encoded scalar.

use std::mem::size_of;

use crate::encoders::Error;
use crate::msgpack::{BufferWriter, MessagePackWriter};
use crate::simd::align;
use crate::simd::{SimdStrategy, VectorWidth};

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    UnalignedPrefix,
    VectorizedBody,
    ScalarTail,
    Done,
}

/// How many elements each stage handles for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    pub width: VectorWidth,
    pub prefix: usize,
    pub body: usize,
    pub tail: usize,
}

impl StagePlan {
    /// Everything in the tail, no vector work at all.
    pub fn scalar(len: usize) -> Self {
        Self {
            width: VectorWidth::Scalar,
            prefix: 0,
            body: 0,
            tail: len,
        }
    }

    /// Splits `data` for a kernel of `width`.
    ///
    /// The body is only entered when at least one full lane group remains
    /// after the prefix; otherwise the whole slice goes to the tail, which
    /// may still use a narrower width.
    pub fn new<T>(data: &[T], width: VectorWidth, strategy: &SimdStrategy) -> Self {
        let len = data.len();
        let lanes = width.lanes(size_of::<T>());
        if lanes == 0 || len < strategy.min_element_count() {
            return Self::scalar(len);
        }

        let prefix = if strategy.aligns_body() {
            match align::prefix_elements(data, width.bytes()) {
                Some(prefix) => prefix.min(len),
                None => return Self::scalar(len),
            }
        } else {
            0
        };

        let body = (len - prefix) / lanes * lanes;
        if body == 0 {
            return Self {
                width,
                prefix: 0,
                body: 0,
                tail: len,
            };
        }

        Self {
            width,
            prefix,
            body,
            tail: len - prefix - body,
        }
    }

    pub fn len(&self) -> usize {
        self.prefix + self.body + self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stage that owns element `index`.
    #[cfg(test)]
    fn stage_of(&self, index: usize) -> Stage {
        if index < self.prefix {
            Stage::UnalignedPrefix
        } else if index < self.prefix + self.body {
            Stage::VectorizedBody
        } else if index < self.len() {
            Stage::ScalarTail
        } else {
            Stage::Done
        }
    }
}

/// Runs `plan` over `data`.
///
/// `kernel` is called with whole lane groups of the width it is given;
/// `scalar` encodes a single element. Cancellation is polled before every
/// scalar element and every kernel call.
pub fn encode_staged<T, W, K, S>(
    data: &[T],
    plan: &StagePlan,
    strategy: &SimdStrategy,
    writer: &mut MessagePackWriter<W>,
    mut kernel: K,
    mut scalar: S,
) -> Result<(), Error>
where
    T: Copy,
    W: BufferWriter,
    K: FnMut(VectorWidth, &[T], &mut MessagePackWriter<W>),
    S: FnMut(T, &mut MessagePackWriter<W>),
{
    debug_assert_eq!(plan.len(), data.len());
    let (prefix, rest) = data.split_at(plan.prefix);
    let (body, tail) = rest.split_at(plan.body);

    encode_scalar(prefix, writer, &mut scalar)?;

    if !body.is_empty() {
        let lanes = plan.width.lanes(size_of::<T>());
        let chunk = (strategy.poll_elements() / lanes).max(1) * lanes;
        for part in body.chunks(chunk) {
            writer.check_cancelled()?;
            kernel(plan.width, part, writer);
        }
    }

    let mut rest = tail;
    for width in plan.width.cascade() {
        let lanes = width.lanes(size_of::<T>());
        let covered = rest.len() / lanes * lanes;
        if covered > 0 {
            writer.check_cancelled()?;
            kernel(width, &rest[..covered], writer);
            rest = &rest[covered..];
        }
    }

    encode_scalar(rest, writer, &mut scalar)
}

fn encode_scalar<T, W, S>(
    values: &[T],
    writer: &mut MessagePackWriter<W>,
    scalar: &mut S,
) -> Result<(), Error>
where
    T: Copy,
    W: BufferWriter,
    S: FnMut(T, &mut MessagePackWriter<W>),
{
    for &value in values {
        writer.check_cancelled()?;
        scalar(value, writer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cancel::CancellationToken;
    use crate::msgpack::VecWriter;

    // Plans are pure arithmetic, so any width can be planned for.
    fn planning_strategy() -> SimdStrategy {
        SimdStrategy::scalar().min_elements(0)
    }

    #[test]
    fn test_plan_splits_on_boundary() {
        let data = vec![0u32; 100];
        let slice = &data[1..];
        let plan = StagePlan::new(slice, VectorWidth::V128, &planning_strategy());
        assert_eq!(plan.len(), 99);
        assert!(plan.prefix < 4);
        assert_eq!(plan.body % 4, 0);
        assert!(plan.tail < 4);
        let body_start = slice[plan.prefix..].as_ptr() as usize;
        assert_eq!(body_start % 16, 0);
    }

    #[test]
    fn test_short_input_goes_to_tail() {
        let data = [1u64, 2, 3];
        let plan = StagePlan::new(&data, VectorWidth::V512, &planning_strategy());
        assert_eq!(plan.body, 0);
        assert_eq!(plan.prefix, 0);
        assert_eq!(plan.tail, 3);
    }

    #[test]
    fn test_min_elements_forces_scalar() {
        let data = vec![0u8; 64];
        let strategy = SimdStrategy::scalar().min_elements(100);
        let plan = StagePlan::new(&data, VectorWidth::V128, &strategy);
        assert_eq!(plan, StagePlan::scalar(64));
    }

    #[test]
    fn test_unaligned_body_without_peel() {
        let data = vec![0u16; 40];
        let strategy = SimdStrategy::scalar().min_elements(0).align_body(false);
        let plan = StagePlan::new(&data[1..], VectorWidth::V128, &strategy);
        assert_eq!(plan.prefix, 0);
        assert_eq!(plan.body, 32);
        assert_eq!(plan.tail, 7);
    }

    #[test]
    fn test_stage_of() {
        let plan = StagePlan {
            width: VectorWidth::V128,
            prefix: 2,
            body: 16,
            tail: 3,
        };
        assert_eq!(plan.stage_of(0), Stage::UnalignedPrefix);
        assert_eq!(plan.stage_of(2), Stage::VectorizedBody);
        assert_eq!(plan.stage_of(18), Stage::ScalarTail);
        assert_eq!(plan.stage_of(21), Stage::Done);
    }

    #[test]
    fn test_staged_kernel_sees_whole_groups() {
        let data: Vec<u8> = (0..70).collect();
        let plan = StagePlan {
            width: VectorWidth::V256,
            prefix: 3,
            body: 64,
            tail: 3,
        };
        let strategy = SimdStrategy::scalar().poll_interval(32);
        let mut writer = MessagePackWriter::new(VecWriter::new());
        let mut calls = Vec::new();
        encode_staged(
            &data,
            &plan,
            &strategy,
            &mut writer,
            |width, part, w| {
                calls.push((width, part.len()));
                w.write_raw(part);
            },
            |v, w| w.write_raw(&[v]),
        )
        .unwrap();
        assert_eq!(
            calls,
            vec![(VectorWidth::V256, 32), (VectorWidth::V256, 32)]
        );
        assert_eq!(writer.into_vec(), data);
    }

    #[test]
    fn test_tail_cascades_to_narrower_width() {
        let data: Vec<u8> = (0..20).collect();
        let plan = StagePlan {
            width: VectorWidth::V256,
            prefix: 0,
            body: 0,
            tail: 20,
        };
        let mut writer = MessagePackWriter::new(VecWriter::new());
        let mut calls = Vec::new();
        encode_staged(
            &data,
            &plan,
            &SimdStrategy::scalar(),
            &mut writer,
            |width, part, w| {
                calls.push((width, part.len()));
                w.write_raw(part);
            },
            |v, w| w.write_raw(&[v]),
        )
        .unwrap();
        assert_eq!(calls, vec![(VectorWidth::V128, 16)]);
        assert_eq!(writer.into_vec(), data);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let mut writer = MessagePackWriter::with_cancellation(VecWriter::new(), token);
        let result = encode_staged(
            &[1u8, 2, 3],
            &StagePlan::scalar(3),
            &SimdStrategy::scalar(),
            &mut writer,
            |_, _, _| {},
            |v, w| w.write_raw(&[v]),
        );
        assert_eq!(result, Err(Error::Cancelled));
        assert!(writer.into_vec().is_empty());
    }
}
