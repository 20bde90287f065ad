//! ZIPX payload decoding
//!
//! A `ZIPX` payload carries a zlib stream after the signature.

use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::debug;

use crate::{CodecError, Result, registry::Codec};

/// Decoder for the deflate-family `ZIPX` scheme
pub struct Zipx;

impl Codec for Zipx {
    fn name(&self) -> &'static str {
        "ZIPX"
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut result = Vec::new();

        decoder
            .read_to_end(&mut result)
            .map_err(|e| CodecError::Decode(format!("zlib inflate failed: {e}")))?;

        debug!("ZIPX: {} bytes -> {} bytes", data.len(), result.len());
        Ok(result)
    }
}
