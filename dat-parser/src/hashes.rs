//! Content-hash table and location resolution
//!
//! The hash table carries one slot per tree entry but is ordered
//! independently of the tree. Each file's normalized path is hashed
//! and searched linearly; the matching slot index, not the tree index,
//! selects the location record that belongs to the file.

use tracing::{trace, warn};

use crate::{ArchiveBuffer, DirectoryTree, LocationRecord, Result};

/// Offset basis of the path hash
pub const HASH_BASIS: u32 = 0x811C_9DC5;
/// Multiplier of the path hash
///
/// Close to the FNV-1a constants but not the FNV prime; archives are
/// keyed with this exact value.
pub const HASH_MULTIPLIER: u32 = 0x0019_9933;
/// Hash-table slot value marking an entry without a payload
pub const NO_HASH: u32 = 0xFFFF_FFFF;

/// Hash a path the way the archive tooling keyed the hash table.
///
/// The path is uppercased and `/` becomes `\` before each byte is
/// folded with xor-and-multiply, wrapping mod 2^32.
pub fn path_hash(path: &str) -> u32 {
    let normalized = path.to_ascii_uppercase().replace('/', "\\");

    let mut hash = HASH_BASIS;
    for &byte in normalized.as_bytes() {
        hash = (hash ^ u32::from(byte)).wrapping_mul(HASH_MULTIPLIER);
    }
    hash
}

/// Offset of the hash table, directly after the location records
pub fn hash_table_base(location_base: usize, file_count: u32) -> usize {
    location_base + file_count as usize * 0x10 + 0x8
}

/// Read one big-endian hash slot per tree entry, in tree order.
///
/// Directory slots are read as the literal on-disk value, which is
/// conventionally [`NO_HASH`].
pub fn read_hash_table(
    buffer: &ArchiveBuffer,
    base: usize,
    entry_count: usize,
) -> Result<Vec<u32>> {
    let mut hashes = Vec::with_capacity(entry_count);
    for slot in 0..entry_count {
        hashes.push(buffer.read_u32(base + slot * 4)?);
    }
    Ok(hashes)
}

/// A file entry bound to its payload location
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    /// Index into the tree list
    pub entry_index: usize,
    /// Hash of the normalized path
    pub hash: u32,
    /// Hash-table slot the hash was found in
    pub slot: usize,
    /// Location record at that slot
    pub location: LocationRecord,
}

/// A file entry whose hash has no slot in the table
#[derive(Debug, Clone)]
pub struct HashMiss {
    /// Index into the tree list
    pub entry_index: usize,
    /// Path that was hashed
    pub path: String,
    /// Hash with no match
    pub hash: u32,
}

/// Bind every file entry to the location record its hash selects.
///
/// Entries whose own slot holds [`NO_HASH`] are skipped. A hash absent
/// from the table is a recoverable miss: the entry is reported back
/// without a location and resolution continues.
pub fn resolve(
    tree: &DirectoryTree,
    hashes: &[u32],
    locations: &[LocationRecord],
) -> (Vec<ResolvedFile>, Vec<HashMiss>) {
    let mut resolved = Vec::new();
    let mut misses = Vec::new();

    for (entry_index, entry) in tree.entries().iter().enumerate() {
        if entry.is_dir {
            continue;
        }
        if hashes.get(entry_index).is_none_or(|&slot| slot == NO_HASH) {
            trace!("Entry {} has no hash slot, skipping", entry.id);
            continue;
        }

        let hash = path_hash(&entry.path);
        let matched = hashes
            .iter()
            .position(|&candidate| candidate == hash)
            .and_then(|slot| locations.get(slot).map(|&location| (slot, location)));

        match matched {
            Some((slot, location)) => {
                trace!(
                    "{} hashed to {hash:#010x}, slot {slot} -> payload at {:#x}",
                    entry.path, location.data_addr
                );
                resolved.push(ResolvedFile {
                    entry_index,
                    hash,
                    slot,
                    location,
                });
            }
            None => {
                warn!("No hash-table slot matches {} ({hash:#010x})", entry.path);
                misses.push(HashMiss {
                    entry_index,
                    path: entry.path.clone(),
                    hash,
                });
            }
        }
    }

    (resolved, misses)
}
