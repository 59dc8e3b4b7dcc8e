//! Byte-stream compression seam for the event codec.
//!
//! The codec core only sees this trait; which deflate implementation backs
//! it is not its concern.

use crate::error::{ClaqueError, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

/// Generic byte-stream compressor.
pub trait Compressor: Send + Sync {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "compressor"
    }
}

/// Gzip-compatible compressor. The wire format requires gzip framing so
/// codes interoperate with generators on other platforms.
#[derive(Debug, Default)]
pub struct GzipCompressor;

impl Compressor for GzipCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| ClaqueError::ShareCodePayload {
                message: e.to_string(),
            })?;
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "gzip"
    }
}
