//! MessagePack format codes and value ranges.

pub const MIN_FIX_INT: u8 = 0x00;
pub const MAX_FIX_INT: u8 = 0x7f;
pub const MIN_FIX_MAP: u8 = 0x80;
pub const MAX_FIX_MAP: u8 = 0x8f;
pub const MIN_FIX_ARRAY: u8 = 0x90;
pub const MAX_FIX_ARRAY: u8 = 0x9f;
pub const MIN_FIX_STR: u8 = 0xa0;
pub const MAX_FIX_STR: u8 = 0xbf;
pub const NIL: u8 = 0xc0;
pub const NEVER_USED: u8 = 0xc1;
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;
pub const BIN8: u8 = 0xc4;
pub const BIN16: u8 = 0xc5;
pub const BIN32: u8 = 0xc6;
pub const EXT8: u8 = 0xc7;
pub const EXT16: u8 = 0xc8;
pub const EXT32: u8 = 0xc9;
pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;
pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;
pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;
pub const FIX_EXT1: u8 = 0xd4;
pub const FIX_EXT2: u8 = 0xd5;
pub const FIX_EXT4: u8 = 0xd6;
pub const FIX_EXT8: u8 = 0xd7;
pub const FIX_EXT16: u8 = 0xd8;
pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;
pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;
pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;
pub const MIN_NEGATIVE_FIX_INT: u8 = 0xe0;
pub const MAX_NEGATIVE_FIX_INT: u8 = 0xff;

/// Value ranges that decide between the compact and the tagged encodings.
pub mod range {
    pub const MIN_FIX_NEGATIVE_INT: i64 = -32;
    pub const MAX_FIX_POSITIVE_INT: i64 = 127;
    pub const MAX_FIX_ARRAY_COUNT: usize = 15;
}

/// Returns true for every code that starts an integer value.
#[inline]
pub const fn is_integer(code: u8) -> bool {
    matches!(code, MIN_FIX_INT..=MAX_FIX_INT | UINT8..=INT64 | MIN_NEGATIVE_FIX_INT..=MAX_NEGATIVE_FIX_INT)
}

/// Human readable name of the format a code introduces.
///
/// Used in decode error messages.
pub const fn format_name(code: u8) -> &'static str {
    match code {
        MIN_FIX_INT..=MAX_FIX_INT => "positive fixint",
        MIN_FIX_MAP..=MAX_FIX_MAP => "fixmap",
        MIN_FIX_ARRAY..=MAX_FIX_ARRAY => "fixarray",
        MIN_FIX_STR..=MAX_FIX_STR => "fixstr",
        NIL => "nil",
        NEVER_USED => "(never used)",
        FALSE | TRUE => "bool",
        BIN8 => "bin 8",
        BIN16 => "bin 16",
        BIN32 => "bin 32",
        EXT8 => "ext 8",
        EXT16 => "ext 16",
        EXT32 => "ext 32",
        FLOAT32 => "float 32",
        FLOAT64 => "float 64",
        UINT8 => "uint 8",
        UINT16 => "uint 16",
        UINT32 => "uint 32",
        UINT64 => "uint 64",
        INT8 => "int 8",
        INT16 => "int 16",
        INT32 => "int 32",
        INT64 => "int 64",
        FIX_EXT1 => "fixext 1",
        FIX_EXT2 => "fixext 2",
        FIX_EXT4 => "fixext 4",
        FIX_EXT8 => "fixext 8",
        FIX_EXT16 => "fixext 16",
        STR8 => "str 8",
        STR16 => "str 16",
        STR32 => "str 32",
        ARRAY16 => "array 16",
        ARRAY32 => "array 32",
        MAP16 => "map 16",
        MAP32 => "map 32",
        MIN_NEGATIVE_FIX_INT..=MAX_NEGATIVE_FIX_INT => "negative fixint",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_codes() {
        assert!(is_integer(0x00));
        assert!(is_integer(0x7f));
        assert!(is_integer(UINT8));
        assert!(is_integer(INT64));
        assert!(is_integer(0xe0));
        assert!(is_integer(0xff));
        assert!(!is_integer(FLOAT32));
        assert!(!is_integer(FIX_EXT1));
        assert!(!is_integer(TRUE));
        assert!(!is_integer(0x90));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(format_name(0x05), "positive fixint");
        assert_eq!(format_name(0x93), "fixarray");
        assert_eq!(format_name(TRUE), "bool");
        assert_eq!(format_name(FLOAT64), "float 64");
        assert_eq!(format_name(0xf0), "negative fixint");
    }
}
