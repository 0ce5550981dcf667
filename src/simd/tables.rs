//! Classification and shuffle tables for the vectorized integer encoder.
//!
//! A 16-byte vector block is split into two 8-byte sub-groups. Every lane of
//! a sub-group is classified into one of the tiers of its [`TierLayout`]
//! (the tier is the number of thresholds the value exceeds). The tiers of
//! the lanes, read as digits of a mixed-radix number with lane 0 least
//! significant, index a [`ShuffleEntry`]:
//!
//! 1. walk the lanes in order;
//! 2. for a tagged tier emit one output slot with shuffle index `0x80`
//!    (yields zero) and the tag in the OR mask;
//! 3. emit the tier's payload bytes big-endian: shuffle indices
//!    `lane * width + payload - 1` down to `lane * width`;
//! 4. the number of slots written is the entry's `len`.
//!
//! `pshufb` and `tbl` both produce zero for an index with the high bit set,
//! so the same entries drive the SSSE3, AVX2, AVX-512 and NEON kernels.
//! Tables are generated once per process and can be re-checked against the
//! scalar encoder with [`ShuffleTable::verify`].
//!
//! | Kind | Tiers | Lanes per group | Entries |
//! |------|-------|-----------------|---------|
//! | i8   | 2     | 8               | 256     |
//! | u8   | 2     | 8               | 256     |
//! | i16  | 5     | 4               | 625     |
//! | u16  | 3     | 4               | 81      |
//! | i32  | 7     | 2               | 49      |
//! | u32  | 4     | 2               | 16      |

use std::sync::OnceLock;

use thiserror::Error;

use crate::msgpack::{codes, scalar};

/// Bytes in one vector block.
pub const BLOCK_BYTES: usize = 16;
/// Input bytes covered by one table lookup.
pub const GROUP_BYTES: usize = 8;
/// Shuffle index that produces a zero byte.
pub const ZERO_LANE: u8 = 0x80;

/// Integer element kinds handled by the array codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl IntegerKind {
    /// Element width in bytes.
    pub const fn width(self) -> usize {
        match self {
            IntegerKind::I8 | IntegerKind::U8 => 1,
            IntegerKind::I16 | IntegerKind::U16 => 2,
            IntegerKind::I32 | IntegerKind::U32 => 4,
            IntegerKind::I64 | IntegerKind::U64 => 8,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            IntegerKind::I8 | IntegerKind::I16 | IntegerKind::I32 | IntegerKind::I64
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntegerKind::I8 => "i8",
            IntegerKind::U8 => "u8",
            IntegerKind::I16 => "i16",
            IntegerKind::U16 => "u16",
            IntegerKind::I32 => "i32",
            IntegerKind::U32 => "u32",
            IntegerKind::I64 => "i64",
            IntegerKind::U64 => "u64",
        }
    }

    /// Smallest and largest value of the kind, widened to `i128`.
    pub const fn bounds(self) -> (i128, i128) {
        match self {
            IntegerKind::I8 => (i8::MIN as i128, i8::MAX as i128),
            IntegerKind::U8 => (0, u8::MAX as i128),
            IntegerKind::I16 => (i16::MIN as i128, i16::MAX as i128),
            IntegerKind::U16 => (0, u16::MAX as i128),
            IntegerKind::I32 => (i32::MIN as i128, i32::MAX as i128),
            IntegerKind::U32 => (0, u32::MAX as i128),
            IntegerKind::I64 => (i64::MIN as i128, i64::MAX as i128),
            IntegerKind::U64 => (0, u64::MAX as i128),
        }
    }

    /// Tier layout for kinds that have a vector path.
    pub fn layout(self) -> Option<&'static TierLayout> {
        match self {
            IntegerKind::I8 => Some(&I8_LAYOUT),
            IntegerKind::U8 => Some(&U8_LAYOUT),
            IntegerKind::I16 => Some(&I16_LAYOUT),
            IntegerKind::U16 => Some(&U16_LAYOUT),
            IntegerKind::I32 => Some(&I32_LAYOUT),
            IntegerKind::U32 => Some(&U32_LAYOUT),
            IntegerKind::I64 | IntegerKind::U64 => None,
        }
    }
}

/// One MessagePack integer size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    /// Type code written before the payload; `None` for fixints
    pub tag: Option<u8>,
    /// Big-endian payload bytes taken from the low end of the value
    pub payload: u8,
}

impl Tier {
    pub const fn encoded_len(self) -> usize {
        self.payload as usize + if self.tag.is_some() { 1 } else { 0 }
    }
}

const FIX: Tier = Tier {
    tag: None,
    payload: 1,
};
const INT8: Tier = Tier {
    tag: Some(codes::INT8),
    payload: 1,
};
const UINT8: Tier = Tier {
    tag: Some(codes::UINT8),
    payload: 1,
};
const INT16: Tier = Tier {
    tag: Some(codes::INT16),
    payload: 2,
};
const UINT16: Tier = Tier {
    tag: Some(codes::UINT16),
    payload: 2,
};
const INT32: Tier = Tier {
    tag: Some(codes::INT32),
    payload: 4,
};
const UINT32: Tier = Tier {
    tag: Some(codes::UINT32),
    payload: 4,
};

/// Tier boundaries of one element kind.
///
/// A value belongs to tier `k` when it is greater than exactly `k` of the
/// ascending `thresholds`.
#[derive(Debug)]
pub struct TierLayout {
    pub kind: IntegerKind,
    pub thresholds: &'static [i64],
    pub tiers: &'static [Tier],
    /// Tier that holds the single-byte fixints
    pub fix_tier: u8,
}

impl TierLayout {
    pub const fn lanes_per_group(&self) -> usize {
        GROUP_BYTES / self.kind.width()
    }

    pub const fn radix(&self) -> usize {
        self.tiers.len()
    }

    /// Scalar classification, the reference the vector compares reproduce.
    pub fn tier_of(&self, value: i64) -> u8 {
        self.thresholds.iter().filter(|&&t| value > t).count() as u8
    }

    pub fn entry_count(&self) -> usize {
        self.radix().pow(self.lanes_per_group() as u32)
    }

    /// Table index for the tiers of one sub-group, lane 0 first.
    #[cfg(test)]
    fn group_index(&self, tiers: &[u8]) -> usize {
        let radix = self.radix();
        tiers
            .iter()
            .rev()
            .fold(0usize, |acc, &tier| acc * radix + tier as usize)
    }

    /// Table index for tiers stored one per `stride` bytes, as they sit in
    /// a vector of per-lane counts written back to memory.
    #[inline]
    pub fn group_index_strided(&self, tiers: &[u8], stride: usize) -> usize {
        let radix = self.radix();
        (0..self.lanes_per_group())
            .rev()
            .fold(0usize, |acc, lane| acc * radix + tiers[lane * stride] as usize)
    }

    /// Table index of a sub-group whose lanes all share `tier`.
    pub fn uniform_index(&self, tier: u8) -> usize {
        let radix = self.radix();
        (0..self.lanes_per_group()).fold(0usize, |acc, _| acc * radix + tier as usize)
    }
}

static I8_LAYOUT: TierLayout = TierLayout {
    kind: IntegerKind::I8,
    thresholds: &[-33],
    tiers: &[INT8, FIX],
    fix_tier: 1,
};

static U8_LAYOUT: TierLayout = TierLayout {
    kind: IntegerKind::U8,
    thresholds: &[127],
    tiers: &[FIX, UINT8],
    fix_tier: 0,
};

static I16_LAYOUT: TierLayout = TierLayout {
    kind: IntegerKind::I16,
    thresholds: &[-129, -33, 127, 255],
    tiers: &[INT16, INT8, FIX, UINT8, UINT16],
    fix_tier: 2,
};

static U16_LAYOUT: TierLayout = TierLayout {
    kind: IntegerKind::U16,
    thresholds: &[127, 255],
    tiers: &[FIX, UINT8, UINT16],
    fix_tier: 0,
};

static I32_LAYOUT: TierLayout = TierLayout {
    kind: IntegerKind::I32,
    thresholds: &[-32769, -129, -33, 127, 255, 65535],
    tiers: &[INT32, INT16, INT8, FIX, UINT8, UINT16, UINT32],
    fix_tier: 3,
};

static U32_LAYOUT: TierLayout = TierLayout {
    kind: IntegerKind::U32,
    thresholds: &[127, 255, 65535],
    tiers: &[FIX, UINT8, UINT16, UINT32],
    fix_tier: 0,
};

/// Shuffle, tag merge and output length for one combination of lane tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct ShuffleEntry {
    pub shuffle: [u8; BLOCK_BYTES],
    pub tags: [u8; BLOCK_BYTES],
    pub len: u8,
}

impl ShuffleEntry {
    /// Scalar model of `shuffle_epi8(src, shuffle) | tags`.
    pub fn apply(&self, src: &[u8; BLOCK_BYTES]) -> [u8; BLOCK_BYTES] {
        let mut out = [0u8; BLOCK_BYTES];
        for (i, slot) in out.iter_mut().enumerate() {
            let index = self.shuffle[i];
            let byte = if index & ZERO_LANE != 0 {
                0
            } else {
                src[(index & 0x0f) as usize]
            };
            *slot = byte | self.tags[i];
        }
        out
    }
}

/// A generated table entry that disagrees with the scalar encoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("{kind}: {found} entries, expected {expected}")]
    EntryCount {
        kind: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("{kind}: value {value} does not classify into tier {tier}")]
    Misclassified {
        kind: &'static str,
        value: i128,
        tier: usize,
    },

    #[error("{kind} entry {index}: len {len} but scalar encoding is {expected} bytes")]
    Length {
        kind: &'static str,
        index: usize,
        len: u8,
        expected: usize,
    },

    #[error("{kind} entry {index}: shuffled {shuffled:02x?} != scalar {expected:02x?}")]
    Shuffle {
        kind: &'static str,
        index: usize,
        shuffled: Vec<u8>,
        expected: Vec<u8>,
    },
}

/// Exhaustive lookup table for one integer kind.
#[derive(Debug)]
pub struct ShuffleTable {
    layout: &'static TierLayout,
    entries: Box<[ShuffleEntry]>,
}

impl ShuffleTable {
    /// Builds every entry for `layout`.
    pub fn generate(layout: &'static TierLayout) -> Self {
        let entries = (0..layout.entry_count())
            .map(|index| Self::build_entry(layout, index))
            .collect();
        Self { layout, entries }
    }

    fn build_entry(layout: &TierLayout, index: usize) -> ShuffleEntry {
        let width = layout.kind.width();
        let radix = layout.radix();
        let mut shuffle = [ZERO_LANE; BLOCK_BYTES];
        let mut tags = [0u8; BLOCK_BYTES];
        let mut out = 0usize;
        let mut digits = index;

        for lane in 0..layout.lanes_per_group() {
            let tier = layout.tiers[digits % radix];
            digits /= radix;

            if let Some(tag) = tier.tag {
                tags[out] = tag;
                out += 1;
            }
            for byte in (0..tier.payload as usize).rev() {
                shuffle[out] = (lane * width + byte) as u8;
                out += 1;
            }
        }

        ShuffleEntry {
            shuffle,
            tags,
            len: out as u8,
        }
    }

    /// Process-wide table for `kind`, or `None` for kinds without one.
    pub fn get(kind: IntegerKind) -> Option<&'static ShuffleTable> {
        static I8: OnceLock<ShuffleTable> = OnceLock::new();
        static U8: OnceLock<ShuffleTable> = OnceLock::new();
        static I16: OnceLock<ShuffleTable> = OnceLock::new();
        static U16: OnceLock<ShuffleTable> = OnceLock::new();
        static I32: OnceLock<ShuffleTable> = OnceLock::new();
        static U32: OnceLock<ShuffleTable> = OnceLock::new();

        let layout = kind.layout()?;
        let cell = match kind {
            IntegerKind::I8 => &I8,
            IntegerKind::U8 => &U8,
            IntegerKind::I16 => &I16,
            IntegerKind::U16 => &U16,
            IntegerKind::I32 => &I32,
            IntegerKind::U32 => &U32,
            IntegerKind::I64 | IntegerKind::U64 => return None,
        };
        Some(cell.get_or_init(|| Self::generate(layout)))
    }

    pub fn layout(&self) -> &'static TierLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entry(&self, index: usize) -> &ShuffleEntry {
        &self.entries[index]
    }

    /// Checks every entry against the scalar encoder.
    ///
    /// For each entry, each lane is filled with the smallest and then the
    /// largest value of its tier; the shuffled bytes must equal the
    /// concatenated scalar encodings and `len` must equal their total size.
    pub fn verify(&self) -> Result<(), TableError> {
        let layout = self.layout;
        let width = layout.kind.width();
        let lanes = layout.lanes_per_group();
        let (kind_min, kind_max) = layout.kind.bounds();

        if self.entries.len() != layout.entry_count() {
            return Err(TableError::EntryCount {
                kind: layout.kind.name(),
                found: self.entries.len(),
                expected: layout.entry_count(),
            });
        }

        for (index, entry) in self.entries.iter().enumerate() {
            for pick_upper in [false, true] {
                let mut src = [0u8; BLOCK_BYTES];
                let mut expected = Vec::with_capacity(BLOCK_BYTES);
                let mut digits = index;

                for lane in 0..lanes {
                    let tier = digits % layout.radix();
                    digits /= layout.radix();

                    let lower = if tier == 0 {
                        kind_min
                    } else {
                        layout.thresholds[tier - 1] as i128 + 1
                    };
                    let upper = if tier == layout.thresholds.len() {
                        kind_max
                    } else {
                        layout.thresholds[tier] as i128
                    };
                    let value = if pick_upper { upper } else { lower };

                    let lane_bytes = (value as i64).to_le_bytes();
                    src[lane * width..(lane + 1) * width].copy_from_slice(&lane_bytes[..width]);

                    let mut encoded = [0u8; scalar::MAX_INT_LEN];
                    let n = scalar::write_i64(&mut encoded, value as i64);
                    if layout.tier_of(value as i64) as usize != tier {
                        return Err(TableError::Misclassified {
                            kind: layout.kind.name(),
                            value,
                            tier,
                        });
                    }
                    expected.extend_from_slice(&encoded[..n]);
                }

                if expected.len() != entry.len as usize {
                    return Err(TableError::Length {
                        kind: layout.kind.name(),
                        index,
                        len: entry.len,
                        expected: expected.len(),
                    });
                }
                let shuffled = entry.apply(&src);
                if shuffled[..expected.len()] != expected[..] {
                    return Err(TableError::Shuffle {
                        kind: layout.kind.name(),
                        index,
                        shuffled: shuffled[..expected.len()].to_vec(),
                        expected,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR_KINDS: [IntegerKind; 6] = [
        IntegerKind::I8,
        IntegerKind::U8,
        IntegerKind::I16,
        IntegerKind::U16,
        IntegerKind::I32,
        IntegerKind::U32,
    ];

    #[test]
    fn test_all_tables_verify() {
        for kind in VECTOR_KINDS {
            let table = ShuffleTable::get(kind).unwrap();
            table.verify().unwrap();
        }
    }

    #[test]
    fn test_verify_reports_corrupted_entries() {
        let layout = IntegerKind::U16.layout().unwrap();
        let table = ShuffleTable::generate(layout);

        let mut entries = table.entries.to_vec();
        entries[3].len += 1;
        let corrupted = ShuffleTable {
            layout,
            entries: entries.into_boxed_slice(),
        };
        assert!(matches!(
            corrupted.verify(),
            Err(TableError::Length {
                kind: "u16",
                index: 3,
                ..
            })
        ));

        let mut entries = table.entries.to_vec();
        entries[0].tags[0] ^= 0x01;
        let corrupted = ShuffleTable {
            layout,
            entries: entries.into_boxed_slice(),
        };
        assert!(matches!(
            corrupted.verify(),
            Err(TableError::Shuffle { index: 0, .. })
        ));

        let truncated = ShuffleTable {
            layout,
            entries: table.entries[..10].to_vec().into_boxed_slice(),
        };
        assert_eq!(
            truncated.verify(),
            Err(TableError::EntryCount {
                kind: "u16",
                found: 10,
                expected: 81,
            })
        );
    }

    #[test]
    fn test_table_sizes() {
        let sizes: Vec<usize> = VECTOR_KINDS
            .iter()
            .map(|&k| ShuffleTable::get(k).unwrap().len())
            .collect();
        assert_eq!(sizes, vec![256, 256, 625, 81, 49, 16]);
    }

    #[test]
    fn test_no_table_for_64_bit() {
        assert!(ShuffleTable::get(IntegerKind::I64).is_none());
        assert!(ShuffleTable::get(IntegerKind::U64).is_none());
    }

    #[test]
    fn test_group_output_fits_one_vector() {
        for kind in VECTOR_KINDS {
            let table = ShuffleTable::get(kind).unwrap();
            let max = (0..table.len())
                .map(|i| table.entry(i).len as usize)
                .max()
                .unwrap();
            assert!(max <= BLOCK_BYTES, "{kind:?} max {max}");
        }
    }

    #[test]
    fn test_tier_thresholds_match_wire_format() {
        let layout = IntegerKind::I32.layout().unwrap();
        let cases = [
            (-32769i64, 0u8),
            (-32768, 1),
            (-129, 1),
            (-128, 2),
            (-33, 2),
            (-32, 3),
            (127, 3),
            (128, 4),
            (255, 4),
            (256, 5),
            (65535, 5),
            (65536, 6),
        ];
        for (value, tier) in cases {
            assert_eq!(layout.tier_of(value), tier, "value {value}");
        }
    }

    #[test]
    fn test_fix_tier_is_single_byte() {
        for kind in VECTOR_KINDS {
            let layout = kind.layout().unwrap();
            let fix = layout.tiers[layout.fix_tier as usize];
            assert_eq!(fix, FIX, "{kind:?}");
        }
    }

    #[test]
    fn test_group_index_is_bitmask_for_two_tiers() {
        let layout = IntegerKind::U8.layout().unwrap();
        let tiers = [1u8, 0, 0, 1, 0, 0, 0, 1];
        assert_eq!(layout.group_index(&tiers), 0b1000_1001);
    }

    #[test]
    fn test_strided_index_matches_packed() {
        let layout = IntegerKind::I32.layout().unwrap();
        let packed = [5u8, 2];
        let strided = [5u8, 0, 0, 0, 2, 0, 0, 0];
        assert_eq!(
            layout.group_index_strided(&strided, 4),
            layout.group_index(&packed)
        );
        assert_eq!(layout.group_index(&packed), 5 + 2 * 7);
    }

    #[test]
    fn test_uniform_fix_index() {
        assert_eq!(IntegerKind::I8.layout().unwrap().uniform_index(1), 0xff);
        assert_eq!(IntegerKind::U8.layout().unwrap().uniform_index(0), 0);
        let i16_layout = IntegerKind::I16.layout().unwrap();
        assert_eq!(i16_layout.uniform_index(2), 2 + 2 * 5 + 2 * 25 + 2 * 125);
    }

    #[test]
    fn test_entry_for_mixed_i16_group() {
        let table = ShuffleTable::get(IntegerKind::I16).unwrap();
        let layout = table.layout();
        // int16, fixint, uint8, uint16
        let values: [i16; 4] = [-200, 5, 200, 300];
        let tiers: Vec<u8> = values.iter().map(|&v| layout.tier_of(v as i64)).collect();
        let entry = table.entry(layout.group_index(&tiers));

        let mut src = [0u8; BLOCK_BYTES];
        for (lane, v) in values.iter().enumerate() {
            src[lane * 2..lane * 2 + 2].copy_from_slice(&v.to_le_bytes());
        }
        let out = entry.apply(&src);
        assert_eq!(entry.len, 3 + 1 + 2 + 3);
        assert_eq!(
            out[..entry.len as usize],
            [0xd1, 0xff, 0x38, 0x05, 0xcc, 0xc8, 0xcd, 0x01, 0x2c]
        );
    }
}
