use crate::cli::global::GlobalArgs;
use msgpack_d::{ArrayCodec, CodecConfig};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Loads the layered configuration and applies `--simd`.
pub fn load_config(global: &GlobalArgs) -> Result<CodecConfig, Box<dyn std::error::Error>> {
    let mut config = CodecConfig::load_with_overrides()?;
    if let Some(policy) = global.simd {
        config.simd.policy = policy;
    }
    Ok(config)
}

pub fn create_codec(config: &CodecConfig) -> ArrayCodec {
    let codec = ArrayCodec::from_config(config);
    tracing::info!(width = %codec.strategy().width(), "codec ready");
    codec
}

/// Reads a file, or all of stdin when no path is given.
pub fn read_input(file: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Writes to a file, or to stdout when no path is given.
pub fn write_output(output: Option<&PathBuf>, data: &[u8]) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()
        }
    }
}
