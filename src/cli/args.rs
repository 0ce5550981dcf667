use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Element type of the array being converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ElementType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

/// Arguments for encoding a JSON array to MessagePack
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Element type of the array
    #[arg(short = 't', long = "type", value_enum)]
    pub element: ElementType,

    /// Input file holding a JSON array (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Write the MessagePack bytes as hex text
    #[arg(long)]
    pub hex: bool,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for decoding MessagePack to a JSON array
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Element type of the array
    #[arg(short = 't', long = "type", value_enum)]
    pub element: ElementType,

    /// Input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Input is hex text rather than raw bytes
    #[arg(long)]
    pub hex: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the features report
#[derive(Args, Debug)]
pub struct FeaturesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for showing the effective configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}
