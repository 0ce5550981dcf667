//! SIMD-accelerated array kernels
//!
//! This module owns capability detection, the [`SimdStrategy`] selected for
//! a call, and the per-architecture kernels behind it. Runtime CPU feature
//! detection runs once per process; every later call reads the cached
//! result.
//!
//! Kernels never see a partial lane group: the stage pipeline in
//! [`crate::encoders::pipeline`] hands them whole multiples of the vector
//! width and finishes the remainder with narrower widths and the scalar
//! writer.

use std::fmt;
use std::sync::OnceLock;

use crate::core::config::{CodecConfig, SimdPolicy};

pub mod align;
pub mod tables;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub(crate) mod x86_64;

#[cfg(all(feature = "simd", target_arch = "aarch64", target_endian = "little"))]
pub(crate) mod aarch64;

#[cfg(not(any(
    all(feature = "simd", target_arch = "x86_64"),
    all(feature = "simd", target_arch = "aarch64", target_endian = "little")
)))]
pub(crate) mod fallback;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub(crate) use x86_64 as arch;

#[cfg(all(feature = "simd", target_arch = "aarch64", target_endian = "little"))]
pub(crate) use aarch64 as arch;

#[cfg(not(any(
    all(feature = "simd", target_arch = "x86_64"),
    all(feature = "simd", target_arch = "aarch64", target_endian = "little")
)))]
pub(crate) use fallback as arch;

/// Register width a kernel runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VectorWidth {
    Scalar,
    V128,
    V256,
    V512,
}

impl VectorWidth {
    /// Register size in bytes; zero for [`VectorWidth::Scalar`].
    pub const fn bytes(self) -> usize {
        match self {
            VectorWidth::Scalar => 0,
            VectorWidth::V128 => 16,
            VectorWidth::V256 => 32,
            VectorWidth::V512 => 64,
        }
    }

    pub const fn bits(self) -> usize {
        self.bytes() * 8
    }

    /// Elements of `element_size` bytes held by one register.
    pub const fn lanes(self, element_size: usize) -> usize {
        if element_size == 0 {
            0
        } else {
            self.bytes() / element_size
        }
    }

    /// Next width down the remainder cascade.
    pub const fn narrower(self) -> Option<VectorWidth> {
        match self {
            VectorWidth::V512 => Some(VectorWidth::V256),
            VectorWidth::V256 => Some(VectorWidth::V128),
            VectorWidth::V128 => Some(VectorWidth::Scalar),
            VectorWidth::Scalar => None,
        }
    }

    pub const fn is_vector(self) -> bool {
        !matches!(self, VectorWidth::Scalar)
    }

    pub const fn name(self) -> &'static str {
        match self {
            VectorWidth::Scalar => "scalar",
            VectorWidth::V128 => "128",
            VectorWidth::V256 => "256",
            VectorWidth::V512 => "512",
        }
    }

    /// Instruction set that backs this width on the current target.
    pub fn instruction_set(self) -> &'static str {
        match self {
            VectorWidth::Scalar => "scalar",
            VectorWidth::V128 if cfg!(target_arch = "aarch64") => "NEON",
            VectorWidth::V128 => "SSSE3",
            VectorWidth::V256 => "AVX2",
            VectorWidth::V512 => "AVX-512",
        }
    }

    /// Every width from `self` down to 128 bits, widest first.
    pub fn cascade(self) -> impl Iterator<Item = VectorWidth> {
        std::iter::successors(Some(self), |w| w.narrower()).filter(|w| w.is_vector())
    }
}

impl fmt::Display for VectorWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorWidth::Scalar => write!(f, "scalar"),
            w => write!(f, "{}-bit", w.bits()),
        }
    }
}

// CPU feature detection cache
static DETECTED_WIDTH: OnceLock<VectorWidth> = OnceLock::new();

#[cfg(target_arch = "x86_64")]
static HAS_SSSE3: OnceLock<bool> = OnceLock::new();

#[cfg(target_arch = "x86_64")]
static HAS_AVX2: OnceLock<bool> = OnceLock::new();

#[cfg(target_arch = "x86_64")]
static HAS_AVX512: OnceLock<bool> = OnceLock::new();

/// Check if SSSE3 is available (cached after first call)
#[cfg(target_arch = "x86_64")]
pub fn has_ssse3() -> bool {
    *HAS_SSSE3.get_or_init(|| is_x86_feature_detected!("ssse3"))
}

/// Check if AVX2 is available (cached after first call)
#[cfg(target_arch = "x86_64")]
pub fn has_avx2() -> bool {
    *HAS_AVX2.get_or_init(|| is_x86_feature_detected!("avx2"))
}

/// Check if the AVX-512 subset the kernels use (F, BW, VL) is available,
/// together with the AVX2 the remainder cascade falls back to.
#[cfg(target_arch = "x86_64")]
pub fn has_avx512() -> bool {
    *HAS_AVX512.get_or_init(|| {
        is_x86_feature_detected!("avx512f")
            && is_x86_feature_detected!("avx512bw")
            && is_x86_feature_detected!("avx512vl")
            && is_x86_feature_detected!("avx2")
    })
}

#[cfg(not(target_arch = "x86_64"))]
pub fn has_ssse3() -> bool {
    false
}

#[cfg(not(target_arch = "x86_64"))]
pub fn has_avx2() -> bool {
    false
}

#[cfg(not(target_arch = "x86_64"))]
pub fn has_avx512() -> bool {
    false
}

/// Check if NEON is available (aarch64 only)
#[cfg(target_arch = "aarch64")]
pub fn has_neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(target_arch = "aarch64"))]
pub fn has_neon() -> bool {
    false
}

/// Widest vector width the kernels may use on this machine.
///
/// Big-endian targets and builds without the `simd` feature always report
/// [`VectorWidth::Scalar`].
pub fn detected_width() -> VectorWidth {
    *DETECTED_WIDTH.get_or_init(|| {
        let width = probe_width();
        tracing::debug!(%width, "detected vector width");
        width
    })
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
fn probe_width() -> VectorWidth {
    if has_avx512() {
        VectorWidth::V512
    } else if has_avx2() {
        VectorWidth::V256
    } else if has_ssse3() {
        VectorWidth::V128
    } else {
        VectorWidth::Scalar
    }
}

#[cfg(all(feature = "simd", target_arch = "aarch64", target_endian = "little"))]
fn probe_width() -> VectorWidth {
    if has_neon() {
        VectorWidth::V128
    } else {
        VectorWidth::Scalar
    }
}

#[cfg(not(any(
    all(feature = "simd", target_arch = "x86_64"),
    all(feature = "simd", target_arch = "aarch64", target_endian = "little")
)))]
fn probe_width() -> VectorWidth {
    VectorWidth::Scalar
}

/// How a single (de)serialization call uses the vector units.
///
/// The width is never wider than [`detected_width`], so every kernel a
/// strategy dispatches to is backed by the running CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimdStrategy {
    width: VectorWidth,
    min_elements: usize,
    align_body: bool,
    poll_interval: usize,
}

impl SimdStrategy {
    pub const DEFAULT_MIN_ELEMENTS: usize = 32;
    pub const DEFAULT_POLL_INTERVAL: usize = 1024;

    /// Widest supported width with default tuning.
    pub fn detect() -> Self {
        Self::with_width(detected_width())
    }

    /// Never vectorizes.
    pub fn scalar() -> Self {
        Self::with_width(VectorWidth::Scalar)
    }

    /// Detected width, capped at `max`.
    pub fn with_max_width(max: VectorWidth) -> Self {
        Self::with_width(detected_width().min(max))
    }

    fn with_width(width: VectorWidth) -> Self {
        Self {
            width,
            min_elements: Self::DEFAULT_MIN_ELEMENTS,
            align_body: true,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    /// Strategy described by a loaded configuration.
    pub fn from_config(config: &CodecConfig) -> Self {
        let detected = detected_width();
        let width = match config.simd.policy {
            SimdPolicy::Auto => detected,
            policy => {
                let requested = policy.max_width().unwrap_or(detected);
                if requested > detected {
                    tracing::warn!(
                        %requested,
                        %detected,
                        "requested vector width is not supported, clamping"
                    );
                }
                requested.min(detected)
            }
        };

        Self {
            width,
            min_elements: config.simd.min_elements,
            align_body: config.simd.align_body,
            poll_interval: config.cancellation.poll_interval.max(1),
        }
    }

    /// Arrays shorter than this are encoded scalar.
    pub fn min_elements(mut self, count: usize) -> Self {
        self.min_elements = count;
        self
    }

    /// Whether an unaligned prefix is peeled before the vector body.
    pub fn align_body(mut self, enabled: bool) -> Self {
        self.align_body = enabled;
        self
    }

    /// Elements between cancellation polls inside the vector body.
    pub fn poll_interval(mut self, elements: usize) -> Self {
        self.poll_interval = elements.max(1);
        self
    }

    pub fn width(&self) -> VectorWidth {
        self.width
    }

    pub fn min_element_count(&self) -> usize {
        self.min_elements
    }

    pub fn aligns_body(&self) -> bool {
        self.align_body
    }

    pub fn poll_elements(&self) -> usize {
        self.poll_interval
    }
}

impl Default for SimdStrategy {
    fn default() -> Self {
        Self::detect()
    }
}
