//! LZ2K payload decoding
//!
//! After the signature an `LZ2K` payload carries two big-endian sizes
//! (decompressed, compressed) followed by an LZSS stream: flag bytes
//! are read bit by bit starting at the least significant bit, a set bit
//! emits one literal byte, a clear bit emits a back-reference packed as
//! a 16-bit big-endian word with a 12-bit distance and a 4-bit length.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};
use tracing::debug;

use crate::{CodecError, Result, registry::Codec};

/// Shortest back-reference the 4-bit length field can express
const MIN_MATCH: usize = 3;

/// Decoder for the LZ-family `LZ2K` scheme
pub struct Lz2k;

impl Codec for Lz2k {
    fn name(&self) -> &'static str {
        "LZ2K"
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < 8 {
            return Err(CodecError::Truncated {
                expected: 8,
                actual: data.len(),
            });
        }

        let mut cursor = Cursor::new(data);
        let decompressed_size = cursor.read_u32::<BigEndian>()? as usize;
        let compressed_size = cursor.read_u32::<BigEndian>()? as usize;

        if compressed_size + 8 != data.len() {
            return Err(CodecError::Decode(format!(
                "LZ2K size mismatch: expected {} bytes, got {}",
                compressed_size + 8,
                data.len()
            )));
        }

        let result = decode_lzss(&data[8..], decompressed_size)?;

        debug!("LZ2K: {} bytes -> {} bytes", data.len(), result.len());
        Ok(result)
    }
}

fn stream_ended(produced: usize, expected: usize) -> CodecError {
    CodecError::Decode(format!(
        "LZ2K stream ended after producing {produced} of {expected} bytes"
    ))
}

fn decode_lzss(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut pos = 0usize;

    while out.len() < expected_len {
        if pos >= src.len() {
            return Err(stream_ended(out.len(), expected_len));
        }
        let flags = src[pos];
        pos += 1;

        for bit in 0..8 {
            if out.len() == expected_len {
                break;
            }
            if flags & (1 << bit) != 0 {
                match src.get(pos) {
                    Some(&byte) => out.push(byte),
                    None => return Err(stream_ended(out.len(), expected_len)),
                }
                pos += 1;
            } else {
                if pos + 2 > src.len() {
                    return Err(stream_ended(out.len(), expected_len));
                }
                let word = u16::from_be_bytes([src[pos], src[pos + 1]]);
                pos += 2;

                let distance = usize::from(word >> 4) + 1;
                let length = usize::from(word & 0x000F) + MIN_MATCH;

                if distance > out.len() {
                    return Err(CodecError::Decode(format!(
                        "LZ2K back-reference reaches {distance} bytes behind with only {} decoded",
                        out.len()
                    )));
                }
                for _ in 0..length {
                    out.push(out[out.len() - distance]);
                }
            }
        }
    }

    if out.len() != expected_len {
        return Err(CodecError::Decode(format!(
            "LZ2K output size mismatch: expected {expected_len} bytes, got {}",
            out.len()
        )));
    }

    Ok(out)
}
