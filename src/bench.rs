//! Benchmarking utilities for comparing codec paths.
//!
//! This module exposes every vector width the running CPU supports as a
//! separate path, so benchmarks can compare them on the same input:
//! - Scalar: byte-at-a-time encoding, no SIMD
//! - Simd128: SSSE3 or NEON
//! - Simd256: AVX2
//! - Simd512: AVX-512 (F, BW, VL)
//!
//! # Example
//!
//! ```
//! use msgpack_d::bench::{available_paths, encode_with_path, mixed_integers};
//!
//! let data: Vec<i32> = mixed_integers(1024, 7);
//! let scalar = encode_with_path(&data, available_paths()[0]).unwrap();
//! for path in available_paths() {
//!     assert_eq!(encode_with_path(&data, path).unwrap(), scalar);
//! }
//! ```

use num_traits::{NumCast, PrimInt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::encoders::{ArrayCodec, ArrayElement, Error};
use crate::msgpack::{MessagePackReader, MessagePackWriter};
use crate::simd::{self, SimdStrategy, VectorWidth};

/// Available codec paths for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodecPath {
    /// Pure scalar implementation (no SIMD)
    Scalar,
    Simd128,
    Simd256,
    Simd512,
}

impl CodecPath {
    pub fn width(self) -> VectorWidth {
        match self {
            CodecPath::Scalar => VectorWidth::Scalar,
            CodecPath::Simd128 => VectorWidth::V128,
            CodecPath::Simd256 => VectorWidth::V256,
            CodecPath::Simd512 => VectorWidth::V512,
        }
    }

    fn from_width(width: VectorWidth) -> Self {
        match width {
            VectorWidth::Scalar => CodecPath::Scalar,
            VectorWidth::V128 => CodecPath::Simd128,
            VectorWidth::V256 => CodecPath::Simd256,
            VectorWidth::V512 => CodecPath::Simd512,
        }
    }

    /// Codec pinned to this path. Small arrays are vectorized too, so a
    /// benchmark measures the path it names.
    pub fn codec(self) -> ArrayCodec {
        ArrayCodec::new(SimdStrategy::with_max_width(self.width()).min_elements(0))
    }
}

impl std::fmt::Display for CodecPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecPath::Scalar => write!(f, "Scalar"),
            path => write!(f, "{}", path.width().instruction_set()),
        }
    }
}

/// Platform capabilities for SIMD.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub arch: &'static str,
    pub simd_features: Vec<&'static str>,
    pub width: VectorWidth,
}

impl PlatformInfo {
    /// Detect current platform capabilities.
    pub fn detect() -> Self {
        let mut simd_features = Vec::new();
        if simd::has_avx512() {
            simd_features.push("AVX-512");
        }
        if simd::has_avx2() {
            simd_features.push("AVX2");
        }
        if simd::has_ssse3() {
            simd_features.push("SSSE3");
        }
        if simd::has_neon() {
            simd_features.push("NEON");
        }

        PlatformInfo {
            arch: std::env::consts::ARCH,
            simd_features,
            width: simd::detected_width(),
        }
    }

    /// Format as display string.
    pub fn display(&self) -> String {
        if self.simd_features.is_empty() {
            self.arch.to_string()
        } else {
            format!("{} ({})", self.arch, self.simd_features.join(", "))
        }
    }
}

/// Paths this CPU can run, scalar first then narrowest to widest.
pub fn available_paths() -> Vec<CodecPath> {
    let mut paths = vec![CodecPath::Scalar]; // Scalar always available
    let mut vector: Vec<_> = simd::detected_width()
        .cascade()
        .map(CodecPath::from_width)
        .collect();
    vector.reverse();
    paths.extend(vector);
    paths
}

/// Encode using a specific path.
///
/// Returns `None` if the path is not available on this CPU.
pub fn encode_with_path<T: ArrayElement>(data: &[T], path: CodecPath) -> Option<Vec<u8>> {
    if path.width() > simd::detected_width() {
        return None;
    }
    let mut writer = MessagePackWriter::in_memory();
    path.codec().serialize(&mut writer, data).ok()?;
    Some(writer.into_vec())
}

/// Decode using a specific path.
///
/// Returns `None` if the path is not available on this CPU.
pub fn decode_with_path<T: ArrayElement>(
    bytes: &[u8],
    path: CodecPath,
) -> Option<Result<Vec<T>, Error>> {
    if path.width() > simd::detected_width() {
        return None;
    }
    Some(path.codec().deserialize(&mut MessagePackReader::new(bytes)))
}

/// Integers spread over every encoding tier of `T`.
///
/// Each value gets a random bit length, so fixints, 8-bit and wider codes
/// all appear. The same seed always yields the same data.
pub fn mixed_integers<T: PrimInt>(len: usize, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let bits = T::zero().count_zeros();
    let signed = T::min_value() < T::zero();
    let min = T::min_value().to_i128().unwrap_or(i128::MIN);
    let max = T::max_value().to_i128().unwrap_or(i128::MAX);

    (0..len)
        .map(|_| {
            let width = rng.random_range(0..=bits);
            let magnitude = match width {
                0 => 0,
                w => (rng.random::<u64>() >> (64 - w.min(64))) as i128,
            };
            let value = if signed && rng.random_bool(0.5) {
                -magnitude
            } else {
                magnitude
            };
            <T as NumCast>::from(value.clamp(min, max)).unwrap_or_else(T::zero)
        })
        .collect()
}

/// Uniform `f32` values in a range wide enough to exercise every exponent
/// the benchmarks care about.
pub fn random_f32(len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0e6f32..1.0e6)).collect()
}

pub fn random_f64(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0e12f64..1.0e12)).collect()
}

pub fn random_bools(len: usize, seed: u64) -> Vec<bool> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_bool(0.5)).collect()
}
