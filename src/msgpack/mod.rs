//! MessagePack wire layer: format codes, scalar encoders and the primitive
//! reader/writer the array codecs are built on.

pub mod codes;
pub mod reader;
pub mod scalar;
pub mod writer;

pub use reader::{Integer, MessagePackReader};
pub use writer::{BufferWriter, MessagePackWriter, VecWriter};
