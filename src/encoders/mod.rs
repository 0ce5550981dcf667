pub mod boolean;
pub mod element;
pub mod errors;
pub mod float;
pub mod integer;
pub mod pipeline;

pub use element::{ArrayCodec, ArrayElement, decode_array, encode_array};
pub use errors::{DecodeError, Error};
pub use pipeline::{Stage, StagePlan};
