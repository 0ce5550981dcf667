use crate::cli::{
    args::DecodeArgs,
    config::{create_codec, read_input, write_output},
    handlers::for_element,
};
use msgpack_d::{ArrayCodec, ArrayElement, CodecConfig, MessagePackReader};
use serde::Serialize;

pub fn handle(args: DecodeArgs, config: &CodecConfig) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(args.file.as_ref())?;
    let bytes = if args.hex {
        let text =
            std::str::from_utf8(&input).map_err(|_| "Hex input is not valid UTF-8 text")?;
        let digits: String = text.split_whitespace().collect();
        hex::decode(digits).map_err(|e| format!("Invalid hex input: {}", e))?
    } else {
        input
    };

    let codec = create_codec(config);
    let mut json = for_element!(args.element, T => decode_json::<T>(&bytes, &codec, args.pretty)?);
    json.push('\n');
    write_output(args.output.as_ref(), json.as_bytes())?;
    Ok(())
}

/// Decodes one MessagePack array of `T` and renders it as JSON.
///
/// Bytes left over after the array are an error: the input must hold
/// exactly one array.
fn decode_json<T: ArrayElement + Serialize>(
    bytes: &[u8],
    codec: &ArrayCodec,
    pretty: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut reader = MessagePackReader::new(bytes);
    let values: Vec<T> = codec.deserialize(&mut reader)?;
    if !reader.is_end() {
        return Err(format!(
            "{} trailing bytes after the array",
            bytes.len() - reader.position()
        )
        .into());
    }
    tracing::debug!(element = T::NAME, count = values.len(), "decoded");

    let json = if pretty {
        serde_json::to_string_pretty(&values)?
    } else {
        serde_json::to_string(&values)?
    };
    Ok(json)
}
