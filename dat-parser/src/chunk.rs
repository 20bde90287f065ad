//! Directory chunk location and header fields

use tracing::{debug, trace};

use crate::{ArchiveBuffer, Error, Result};

/// Find the directory chunk: the offset of the LAST occurrence of
/// `signature` in the buffer.
///
/// Payload bytes may legitimately contain the signature pattern, so
/// only the occurrence at the highest address marks the real chunk.
pub fn locate_chunk(buffer: &ArchiveBuffer, signature: &[u8]) -> Result<usize> {
    let offset = buffer
        .rfind(signature)
        .ok_or(Error::SignatureNotFound(buffer.len()))?;

    debug!("Directory chunk signature at {offset:#x}");
    Ok(offset)
}

/// Fixed-layout fields around the chunk signature
#[derive(Debug, Clone)]
pub struct ChunkHeader {
    /// Offset of the signature in the archive
    pub offset: usize,
    /// Bytes left in the archive past this point; retained, not interpreted
    pub archive_remaining_size: u32,
    /// Container version word; retained, not interpreted
    pub version: u32,
    /// Number of file entries (directories not counted)
    pub file_count: u32,
    /// Byte length of the name-table region
    pub chunk_size: u32,
}

impl ChunkHeader {
    /// Read the header fields around `chunk_offset`.
    ///
    /// The four bytes before the signature hold `archive_remaining_size`,
    /// so offsets under 4 cannot be valid.
    pub fn read(buffer: &ArchiveBuffer, chunk_offset: usize) -> Result<Self> {
        if chunk_offset < 4 || chunk_offset > buffer.len() {
            return Err(Error::InvalidChunkOffset {
                offset: chunk_offset,
                len: buffer.len(),
            });
        }

        let header = Self {
            offset: chunk_offset,
            archive_remaining_size: buffer.read_u32(chunk_offset - 0x4)?,
            version: buffer.read_u32(chunk_offset + 0xC)?,
            file_count: buffer.read_u32(chunk_offset + 0x10)?,
            chunk_size: buffer.read_u32(chunk_offset + 0x18)?,
        };

        trace!(
            "Chunk header: version={}, file_count={}, chunk_size={:#x}, remaining={:#x}",
            header.version, header.file_count, header.chunk_size, header.archive_remaining_size
        );

        Ok(header)
    }
}
