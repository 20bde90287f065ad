//! Payload location table

use tracing::{trace, warn};

use crate::names::{METADATA_RECORD_SIZE, NAME_TABLE_OFFSET};
use crate::{ArchiveBuffer, DirectoryTree, Result};

/// Size of one location record
pub(crate) const LOCATION_RECORD_SIZE: usize = 0x10;

/// Where one payload lives in the archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationRecord {
    /// Packed format word; retained, not interpreted
    pub packed_version: u32,
    /// Absolute payload offset in the archive
    pub data_addr: u32,
    /// On-disk payload size
    pub compressed_size: u32,
    /// Payload size after decompression
    pub raw_size: u32,
}

impl LocationRecord {
    /// Whether the payload needs a decompression pass.
    ///
    /// Equal sizes mean the payload is stored as-is.
    pub fn is_compressed(&self) -> bool {
        self.raw_size != self.compressed_size
    }

    /// Byte count to read at `data_addr`
    pub fn stored_size(&self) -> u32 {
        if self.is_compressed() {
            self.compressed_size
        } else {
            self.raw_size
        }
    }
}

/// Offset of the location-table header, directly after the metadata
/// records.
pub fn location_table_base(chunk_offset: usize, chunk_size: u32, entry_count: usize) -> usize {
    chunk_offset
        + NAME_TABLE_OFFSET
        + chunk_size as usize
        + 0x10
        + METADATA_RECORD_SIZE * entry_count
}

/// Read the location table, one record per tree slot.
///
/// On disk the table only holds records for files, in tree order.
/// Directory slots receive a zero placeholder and do not advance the
/// read cursor, keeping the output index-aligned with the tree.
pub fn read_locations(
    buffer: &ArchiveBuffer,
    base: usize,
    file_count: u32,
    tree: &DirectoryTree,
) -> Result<Vec<LocationRecord>> {
    let type_tag = buffer.read_u32(base)?;
    let file_count2 = buffer.read_u32(base + 0x4)?;
    trace!("Location table at {base:#x}, type tag {type_tag:#x}");

    if file_count2 != file_count {
        warn!(
            "Location table holds {file_count2} file records but the header declares {file_count}"
        );
    }

    let mut records = Vec::with_capacity(tree.len());
    let mut cursor = base + 0x8;

    for entry in tree.entries() {
        if entry.is_dir {
            records.push(LocationRecord::default());
            continue;
        }

        let record = LocationRecord {
            packed_version: buffer.read_u32(cursor)?,
            data_addr: buffer.read_u32(cursor + 0x4)?,
            compressed_size: buffer.read_u32(cursor + 0x8)?,
            raw_size: buffer.read_u32(cursor + 0xC)?,
        };
        trace!(
            "Entry {} payload at {:#x} ({} -> {} bytes)",
            entry.id, record.data_addr, record.compressed_size, record.raw_size
        );
        records.push(record);
        cursor += LOCATION_RECORD_SIZE;
    }

    Ok(records)
}
