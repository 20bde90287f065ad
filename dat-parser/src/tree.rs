//! Directory tree reconstruction
//!
//! Entries arrive in stream order with parents before children. The
//! list index of each entry doubles as its slot in the location and
//! hash tables, so the tree is append-only and never reordered.

use std::collections::HashMap;

use tracing::trace;

use crate::{Error, RawEntry, Result};

/// One file or directory of the reconstructed tree
#[derive(Debug, Clone)]
pub struct Entry {
    /// 1-based sequence index from the name table
    pub id: u16,
    /// Sequence index of the parent directory, 0 for top-level entries
    pub parent_id: u16,
    /// Entry name
    pub name: String,
    /// Full path from the archive root
    pub path: String,
    /// Names without a `.` are directories
    pub is_dir: bool,
    /// Opaque metadata words carried over from the name table
    pub name_offset: u32,
    pub reserved: [u16; 3],
}

/// Append-only entry list with id-based parent lookup
pub struct DirectoryTree {
    entries: Vec<Entry>,
    by_id: HashMap<u16, usize>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Build a tree from raw entries in stream order.
    pub fn build(raws: Vec<RawEntry>) -> Result<Self> {
        let mut tree = Self::new();
        for raw in raws {
            tree.add_entry(raw)?;
        }
        Ok(tree)
    }

    /// Append `raw`, deriving its path from the already-added parent.
    ///
    /// A parent id that has not appeared yet is a format error; the
    /// container writes parents strictly before their children.
    pub fn add_entry(&mut self, raw: RawEntry) -> Result<()> {
        let RawEntry {
            id,
            name,
            name_offset,
            parent_id,
            reserved,
        } = raw;

        let path = if parent_id == 0 {
            name.clone()
        } else {
            match self.by_id.get(&parent_id).map(|&index| &self.entries[index]) {
                Some(parent) => format!("{}/{}", parent.path, name),
                None => {
                    return Err(Error::DanglingParent {
                        id,
                        parent_id,
                        name,
                    });
                }
            }
        };

        let is_dir = !name.contains('.');
        trace!(
            "Entry {id}: {path} ({})",
            if is_dir { "directory" } else { "file" }
        );

        let index = self.entries.len();
        self.entries.push(Entry {
            id,
            parent_id,
            name,
            path,
            is_dir,
            name_offset,
            reserved,
        });
        // First entry with a given id wins parent lookups.
        self.by_id.entry(id).or_insert(index);
        Ok(())
    }

    /// Entries in stream order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entry count, directories included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of file entries
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_dir).count()
    }

    /// Number of directory entries
    pub fn dir_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_dir).count()
    }

    /// First entry added under `id`, if any
    pub fn by_id(&self, id: u16) -> Option<&Entry> {
        self.by_id.get(&id).map(|&index| &self.entries[index])
    }
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}
