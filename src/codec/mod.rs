//! Share-code codec: compact, versioned, URL-safe event encoding.

pub mod compress;
pub mod encoder;

pub use compress::{Compressor, GzipCompressor};
pub use encoder::{CodecVersion, CompressionStats, EventCodec, decode_event, encode_event};
