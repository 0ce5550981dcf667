use crate::cli::{
    args::EncodeArgs,
    config::{create_codec, read_input, write_output},
    handlers::for_element,
};
use msgpack_d::{ArrayCodec, ArrayElement, CodecConfig, MessagePackWriter};
use serde::de::DeserializeOwned;

pub fn handle(args: EncodeArgs, config: &CodecConfig) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(args.file.as_ref())?;
    let codec = create_codec(config);

    let bytes = for_element!(args.element, T => encode_json::<T>(&input, &codec)?);

    if args.hex {
        let mut text = hex::encode(&bytes);
        text.push('\n');
        write_output(args.output.as_ref(), text.as_bytes())?;
    } else {
        write_output(args.output.as_ref(), &bytes)?;
    }
    Ok(())
}

/// Parses a JSON array of `T` and encodes it as one MessagePack array.
fn encode_json<T: ArrayElement + DeserializeOwned>(
    input: &[u8],
    codec: &ArrayCodec,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let values: Vec<T> = serde_json::from_slice(input)
        .map_err(|e| format!("Input is not a JSON array of {}: {}", T::NAME, e))?;
    tracing::debug!(element = T::NAME, count = values.len(), "encoding");

    let mut writer = MessagePackWriter::in_memory();
    codec.serialize(&mut writer, &values)?;
    Ok(writer.into_vec())
}
