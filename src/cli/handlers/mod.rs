pub mod config;
pub mod decode;
pub mod encode;
pub mod features;

/// Expands `$body` once per element type with `$t` bound to the Rust type.
macro_rules! for_element {
    ($element:expr, $t:ident => $body:expr) => {
        match $element {
            $crate::cli::args::ElementType::Bool => {
                type $t = bool;
                $body
            }
            $crate::cli::args::ElementType::I8 => {
                type $t = i8;
                $body
            }
            $crate::cli::args::ElementType::I16 => {
                type $t = i16;
                $body
            }
            $crate::cli::args::ElementType::I32 => {
                type $t = i32;
                $body
            }
            $crate::cli::args::ElementType::I64 => {
                type $t = i64;
                $body
            }
            $crate::cli::args::ElementType::U8 => {
                type $t = u8;
                $body
            }
            $crate::cli::args::ElementType::U16 => {
                type $t = u16;
                $body
            }
            $crate::cli::args::ElementType::U32 => {
                type $t = u32;
                $body
            }
            $crate::cli::args::ElementType::U64 => {
                type $t = u64;
                $body
            }
            $crate::cli::args::ElementType::F32 => {
                type $t = f32;
                $body
            }
            $crate::cli::args::ElementType::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}

pub(crate) use for_element;
