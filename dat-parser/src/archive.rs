//! Archive decoding pipeline

use std::path::Path;

use tracing::{info, warn};

use dat_codec::CodecRegistry;

use crate::chunk::{self, ChunkHeader};
use crate::hashes::{self, HashMiss, ResolvedFile};
use crate::locations::{self, LocationRecord};
use crate::names;
use crate::tree::{DirectoryTree, Entry};
use crate::{ArchiveBuffer, DIR_CHUNK_SIGNATURE, Result};

/// A fully decoded archive directory.
///
/// Owns the buffer and the output of every pipeline stage. The stages
/// run strictly in sequence; the first fatal format error aborts the
/// parse.
pub struct DatArchive {
    buffer: ArchiveBuffer,
    header: ChunkHeader,
    tree: DirectoryTree,
    locations: Vec<LocationRecord>,
    hash_table: Vec<u32>,
    resolved: Vec<ResolvedFile>,
    misses: Vec<HashMiss>,
}

impl DatArchive {
    /// Decode the directory structures of `buffer`.
    pub fn parse(buffer: ArchiveBuffer) -> Result<Self> {
        let chunk_offset = chunk::locate_chunk(&buffer, &DIR_CHUNK_SIGNATURE)?;
        let header = ChunkHeader::read(&buffer, chunk_offset)?;

        let raws = names::parse_names(&buffer, header.offset, header.chunk_size)?;
        let tree = DirectoryTree::build(raws)?;

        if tree.file_count() != header.file_count as usize {
            warn!(
                "Tree holds {} files but the header declares {}",
                tree.file_count(),
                header.file_count
            );
        }

        let location_base =
            locations::location_table_base(header.offset, header.chunk_size, tree.len());
        let location_records =
            locations::read_locations(&buffer, location_base, header.file_count, &tree)?;

        let hash_base = hashes::hash_table_base(location_base, header.file_count);
        let hash_table = hashes::read_hash_table(&buffer, hash_base, tree.len())?;

        let (resolved, misses) = hashes::resolve(&tree, &hash_table, &location_records);

        info!(
            "Parsed {} entries ({} files, {} directories), {} payloads resolved",
            tree.len(),
            tree.file_count(),
            tree.dir_count(),
            resolved.len()
        );

        Ok(Self {
            buffer,
            header,
            tree,
            locations: location_records,
            hash_table,
            resolved,
            misses,
        })
    }

    /// Open and decode an archive file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(ArchiveBuffer::open(path)?)
    }

    /// The underlying archive bytes
    pub fn buffer(&self) -> &ArchiveBuffer {
        &self.buffer
    }

    /// Chunk header fields
    pub fn header(&self) -> &ChunkHeader {
        &self.header
    }

    /// Reconstructed tree entries in stream order
    pub fn entries(&self) -> &[Entry] {
        self.tree.entries()
    }

    /// The reconstructed tree
    pub fn tree(&self) -> &DirectoryTree {
        &self.tree
    }

    /// Location records, index-aligned with [`Self::entries`]
    pub fn locations(&self) -> &[LocationRecord] {
        &self.locations
    }

    /// On-disk hash slots, index-aligned with [`Self::entries`]
    pub fn hash_table(&self) -> &[u32] {
        &self.hash_table
    }

    /// Files bound to a payload location
    pub fn resolved(&self) -> &[ResolvedFile] {
        &self.resolved
    }

    /// Files whose hash had no slot in the table
    pub fn misses(&self) -> &[HashMiss] {
        &self.misses
    }

    /// Hex dump of the 7-byte magic header at the start of the archive
    pub fn magic_header(&self) -> Result<String> {
        self.buffer.read_hex(0x0, 0x7)
    }

    /// Raw payload bytes for `file`, still compressed when the location
    /// record says so.
    pub fn read_payload(&self, file: &ResolvedFile) -> Result<&[u8]> {
        let location = &file.location;
        self.buffer
            .bytes(location.data_addr as usize, location.stored_size() as usize)
    }

    /// Payload bytes for `file`, decoded through `registry` when the
    /// location record marks them compressed.
    ///
    /// Codec failures come back as [`crate::Error::Codec`] and leave
    /// the archive usable; the caller decides whether to skip the
    /// entry.
    pub fn extract(&self, file: &ResolvedFile, registry: &CodecRegistry) -> Result<Vec<u8>> {
        let payload = self.read_payload(file)?;

        if !file.location.is_compressed() {
            return Ok(payload.to_vec());
        }
        Ok(registry.decode(payload)?)
    }
}
