//! Round-trip and scalar/vector equivalence for every element type.
//!
//! Encoded bytes are compared against a small reference writer kept in this
//! file, so the vector paths are checked against MessagePack itself rather
//! than against the crate's own scalar writer.

use msgpack_d::bench::{CodecPath, available_paths};
use msgpack_d::prelude::*;
use proptest::prelude::*;

/// Canonical (smallest) MessagePack encoding of an integer.
fn reference_int(value: i128, out: &mut Vec<u8>) {
    match value {
        0..=127 => out.push(value as u8),
        -32..=-1 => out.push(value as i8 as u8),
        128..=0xff => out.extend_from_slice(&[0xcc, value as u8]),
        0x100..=0xffff => {
            out.push(0xcd);
            out.extend_from_slice(&(value as u16).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xce);
            out.extend_from_slice(&(value as u32).to_be_bytes());
        }
        v if v > 0 => {
            out.push(0xcf);
            out.extend_from_slice(&(value as u64).to_be_bytes());
        }
        -128..=-33 => out.extend_from_slice(&[0xd0, value as i8 as u8]),
        -32768..=-129 => {
            out.push(0xd1);
            out.extend_from_slice(&(value as i16).to_be_bytes());
        }
        -2_147_483_648..=-32769 => {
            out.push(0xd2);
            out.extend_from_slice(&(value as i32).to_be_bytes());
        }
        _ => {
            out.push(0xd3);
            out.extend_from_slice(&(value as i64).to_be_bytes());
        }
    }
}

fn reference_header(len: usize) -> Vec<u8> {
    match len {
        0..=15 => vec![0x90 | len as u8],
        16..=0xffff => {
            let mut out = vec![0xdc];
            out.extend_from_slice(&(len as u16).to_be_bytes());
            out
        }
        _ => {
            let mut out = vec![0xdd];
            out.extend_from_slice(&(len as u32).to_be_bytes());
            out
        }
    }
}

fn reference_ints<T: Copy + Into<i128>>(data: &[T]) -> Vec<u8> {
    let mut out = reference_header(data.len());
    for &v in data {
        reference_int(v.into(), &mut out);
    }
    out
}

fn reference_f32(data: &[f32]) -> Vec<u8> {
    let mut out = reference_header(data.len());
    for v in data {
        out.push(0xca);
        out.extend_from_slice(&v.to_bits().to_be_bytes());
    }
    out
}

fn reference_f64(data: &[f64]) -> Vec<u8> {
    let mut out = reference_header(data.len());
    for v in data {
        out.push(0xcb);
        out.extend_from_slice(&v.to_bits().to_be_bytes());
    }
    out
}

fn reference_bools(data: &[bool]) -> Vec<u8> {
    let mut out = reference_header(data.len());
    out.extend(data.iter().map(|&b| if b { 0xc3 } else { 0xc2 }));
    out
}

fn encode<T: ArrayElement>(path: CodecPath, data: &[T]) -> Vec<u8> {
    let mut writer = MessagePackWriter::in_memory();
    path.codec().serialize(&mut writer, data).unwrap();
    writer.into_vec()
}

fn decode<T: ArrayElement>(path: CodecPath, bytes: &[u8]) -> Vec<T> {
    let mut reader = MessagePackReader::new(bytes);
    let values = path.codec().deserialize(&mut reader).unwrap();
    assert!(reader.is_end());
    values
}

/// Lengths around every lane-group size from 8 to 64 elements.
const EDGE_LENGTHS: [usize; 14] = [0, 1, 7, 8, 9, 15, 16, 17, 31, 32, 33, 63, 64, 65];

macro_rules! integer_round_trip {
    ($name:ident, $prop:ident, $ty:ty) => {
        #[test]
        fn $name() {
            for len in EDGE_LENGTHS {
                let data: Vec<$ty> = msgpack_d::bench::mixed_integers(len, len as u64);
                let expected = reference_ints(&data);
                for path in available_paths() {
                    assert_eq!(encode(path, &data), expected, "len {len} on {path}");
                    assert_eq!(decode::<$ty>(path, &expected), data, "len {len} on {path}");
                }
            }
        }

        proptest! {
            #[test]
            fn $prop(data in prop::collection::vec(any::<$ty>(), 0..300)) {
                let expected = reference_ints(&data);
                for path in available_paths() {
                    prop_assert_eq!(encode(path, &data), expected.clone());
                    prop_assert_eq!(decode::<$ty>(path, &expected), data.clone());
                }
            }
        }
    };
}

integer_round_trip!(test_i8_edge_lengths, proptest_i8, i8);
integer_round_trip!(test_u8_edge_lengths, proptest_u8, u8);
integer_round_trip!(test_i16_edge_lengths, proptest_i16, i16);
integer_round_trip!(test_u16_edge_lengths, proptest_u16, u16);
integer_round_trip!(test_i32_edge_lengths, proptest_i32, i32);
integer_round_trip!(test_u32_edge_lengths, proptest_u32, u32);
integer_round_trip!(test_i64_edge_lengths, proptest_i64, i64);
integer_round_trip!(test_u64_edge_lengths, proptest_u64, u64);

proptest! {
    #[test]
    fn proptest_f32_bits(bits in prop::collection::vec(any::<u32>(), 0..200)) {
        let data: Vec<f32> = bits.iter().map(|&b| f32::from_bits(b)).collect();
        let expected = reference_f32(&data);
        for path in available_paths() {
            prop_assert_eq!(encode(path, &data), expected.clone());
            let decoded: Vec<u32> = decode::<f32>(path, &expected).iter().map(|f| f.to_bits()).collect();
            prop_assert_eq!(&decoded, &bits);
        }
    }

    #[test]
    fn proptest_f64_bits(bits in prop::collection::vec(any::<u64>(), 0..200)) {
        let data: Vec<f64> = bits.iter().map(|&b| f64::from_bits(b)).collect();
        let expected = reference_f64(&data);
        for path in available_paths() {
            prop_assert_eq!(encode(path, &data), expected.clone());
            let decoded: Vec<u64> = decode::<f64>(path, &expected).iter().map(|f| f.to_bits()).collect();
            prop_assert_eq!(&decoded, &bits);
        }
    }

    #[test]
    fn proptest_bools(data in prop::collection::vec(any::<bool>(), 0..400)) {
        let expected = reference_bools(&data);
        for path in available_paths() {
            prop_assert_eq!(encode(path, &data), expected.clone());
            prop_assert_eq!(decode::<bool>(path, &expected), data.clone());
        }
    }
}

#[test]
fn test_float_and_bool_edge_lengths() {
    for len in EDGE_LENGTHS {
        let floats = msgpack_d::bench::random_f32(len, 11);
        let doubles = msgpack_d::bench::random_f64(len, 12);
        let bools = msgpack_d::bench::random_bools(len, 13);
        for path in available_paths() {
            assert_eq!(encode(path, &floats), reference_f32(&floats), "len {len} on {path}");
            assert_eq!(encode(path, &doubles), reference_f64(&doubles), "len {len} on {path}");
            assert_eq!(encode(path, &bools), reference_bools(&bools), "len {len} on {path}");
        }
    }
}

#[test]
fn test_misaligned_input_slices() {
    // Sub-slices start at every offset inside a vector register.
    let backing: Vec<i32> = msgpack_d::bench::mixed_integers(300, 99);
    for start in 0..16 {
        let data = &backing[start..start + 200];
        for path in available_paths() {
            assert_eq!(encode(path, data), reference_ints(data), "offset {start} on {path}");
        }
    }
}

#[test]
fn test_several_arrays_in_one_stream() {
    let codec = ArrayCodec::detect();
    let mut writer = MessagePackWriter::in_memory();
    codec.serialize(&mut writer, &[1u8, 2, 3]).unwrap();
    codec.serialize(&mut writer, &[0.5f64; 20]).unwrap();
    codec.serialize(&mut writer, &[true; 40]).unwrap();
    let bytes = writer.into_vec();

    let mut reader = MessagePackReader::new(&bytes);
    assert_eq!(codec.deserialize::<u8>(&mut reader).unwrap(), vec![1, 2, 3]);
    assert_eq!(codec.deserialize::<f64>(&mut reader).unwrap(), vec![0.5; 20]);
    assert_eq!(codec.deserialize::<bool>(&mut reader).unwrap(), vec![true; 40]);
    assert!(reader.is_end());
}
