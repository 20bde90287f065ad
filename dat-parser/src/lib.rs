//! Decoder for the trailing-directory DAT archive container.
//!
//! Archives are flat binary blobs with a directory chunk near the end,
//! found by scanning for its signature. The chunk interleaves a
//! null-terminated name table, fixed-size metadata records, a payload
//! location table and a content-hash table; the decoder rebuilds the
//! file tree from them and binds every file to its payload bytes via a
//! custom 32-bit path hash.

pub mod archive;
pub mod buffer;
pub mod chunk;
mod error;
pub mod hashes;
pub mod locations;
pub mod names;
pub mod tree;

pub use archive::DatArchive;
pub use buffer::ArchiveBuffer;
pub use chunk::ChunkHeader;
pub use error::Error;
pub use hashes::{HashMiss, NO_HASH, ResolvedFile, path_hash};
pub use locations::LocationRecord;
pub use names::RawEntry;
pub use tree::{DirectoryTree, Entry};

pub type Result<T> = std::result::Result<T, Error>;

/// Signature marking the directory chunk
pub const DIR_CHUNK_SIGNATURE: [u8; 8] = *b".CC40TAD";
