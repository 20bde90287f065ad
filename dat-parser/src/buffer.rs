//! Bounds-checked access to the raw archive bytes

use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use tracing::{debug, warn};

use crate::{Error, Result};

/// An archive image held in memory.
///
/// Integer fields in the container are big-endian regardless of host.
/// Every read goes through a bounds check; an offset past the end
/// returns [`Error::OutOfBounds`] instead of touching memory outside
/// the buffer.
pub struct ArchiveBuffer {
    data: Vec<u8>,
}

impl ArchiveBuffer {
    /// Wrap an in-memory archive image
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Read an archive file into memory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;

        if data.is_empty() {
            warn!("File is empty: {}", path.display());
        }
        debug!("Read {} bytes from {}", data.len(), path.display());

        Ok(Self::new(data))
    }

    /// Archive size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check(&self, offset: usize, len: usize) -> Result<()> {
        if offset
            .checked_add(len)
            .is_none_or(|end| end > self.data.len())
        {
            return Err(Error::OutOfBounds {
                offset,
                len,
                size: self.data.len(),
            });
        }
        Ok(())
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.check(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }

    /// Read one byte
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.check(offset, 1)?;
        Ok(self.data[offset])
    }

    /// Read a big-endian `u16`
    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let mut bytes = self.bytes(offset, 2)?;
        Ok(bytes.read_u16::<BigEndian>()?)
    }

    /// Read a big-endian `u32`
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let mut bytes = self.bytes(offset, 4)?;
        Ok(bytes.read_u32::<BigEndian>()?)
    }

    /// Offset of the last occurrence of `needle`
    pub fn rfind(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        self.data.windows(needle.len()).rposition(|w| w == needle)
    }

    /// Uppercase hex dump of up to `len` bytes at `offset`, clamped to
    /// the end of the buffer
    pub fn read_hex(&self, offset: usize, len: usize) -> Result<String> {
        if offset >= self.data.len() {
            return Err(Error::OutOfBounds {
                offset,
                len,
                size: self.data.len(),
            });
        }
        let end = offset.saturating_add(len).min(self.data.len());
        Ok(hex::encode_upper(&self.data[offset..end]))
    }
}
