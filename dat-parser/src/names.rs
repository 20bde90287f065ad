//! Name table and per-entry metadata records

use tracing::{trace, warn};

use crate::{ArchiveBuffer, Result};

/// Offset from the chunk signature to the first name byte
pub const NAME_TABLE_OFFSET: usize = 0x1C;
/// Stride between consecutive metadata records
pub(crate) const METADATA_RECORD_SIZE: usize = 0xC;

/// One name-table entry together with its metadata record
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// 1-based sequence index; 0 is reserved
    pub id: u16,
    /// Entry name without the terminator
    pub name: String,
    /// Name offset word from the metadata record; retained, not interpreted
    pub name_offset: u32,
    /// Sequence index of the parent directory, 0 for top-level entries
    pub parent_id: u16,
    /// Reserved metadata words; retained, not interpreted
    pub reserved: [u16; 3],
}

/// Parse the name table and the metadata record of each entry.
///
/// The table starts at `chunk_offset + 0x1C` and spans `chunk_size - 2`
/// bytes of null-terminated names, each terminator followed by one
/// padding byte. Sequence indices start at 1 and empty names are
/// skipped without consuming an index. The 12-byte metadata record of
/// entry `seq` sits at `chunk_offset + 0x1C + chunk_size + seq * 0xC`;
/// only `parent_id` feeds the tree, the other words ride along as
/// opaque data.
pub fn parse_names(
    buffer: &ArchiveBuffer,
    chunk_offset: usize,
    chunk_size: u32,
) -> Result<Vec<RawEntry>> {
    let table_offset = chunk_offset + NAME_TABLE_OFFSET;
    let table_len = (chunk_size as usize).saturating_sub(2);
    let table = buffer.bytes(table_offset, table_len)?;
    let metadata_base = table_offset + chunk_size as usize;

    let mut entries = Vec::new();
    let mut read_index = 0usize;
    let mut id: u16 = 1;

    while read_index < table.len() {
        let rest = &table[read_index..];
        let Some(name_end) = rest.iter().position(|&b| b == 0) else {
            // No terminator before the table ends; the format never
            // produces this, drop the partial name.
            trace!(
                "Dropping {} unterminated name bytes at table offset {read_index:#x}",
                rest.len()
            );
            break;
        };
        let name = String::from_utf8_lossy(&rest[..name_end]).into_owned();
        // Terminator plus one padding byte
        read_index += name_end + 2;

        if name.is_empty() {
            warn!("The extracted file name was empty");
            continue;
        }

        let record = metadata_base + usize::from(id) * METADATA_RECORD_SIZE;
        let entry = RawEntry {
            id,
            name,
            name_offset: buffer.read_u32(record + 0x4)?,
            parent_id: buffer.read_u16(record + 0x8)?,
            reserved: [
                buffer.read_u16(record + 0xA)?,
                buffer.read_u16(record + 0xC)?,
                buffer.read_u16(record + 0xE)?,
            ],
        };
        trace!(
            "Entry {}: {:?} (parent {}, name offset {:#x})",
            entry.id, entry.name, entry.parent_id, entry.name_offset
        );
        entries.push(entry);
        id += 1;
    }

    Ok(entries)
}
