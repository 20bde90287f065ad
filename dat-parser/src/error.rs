use thiserror::Error;

/// Archive decoding error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No directory chunk signature anywhere in the buffer
    #[error("Directory chunk signature not found in {0} byte archive")]
    SignatureNotFound(usize),

    /// Chunk offset leaves no room for the fields around the signature
    #[error("Invalid chunk offset {offset:#x} for a {len} byte archive")]
    InvalidChunkOffset { offset: usize, len: usize },

    /// Read past the end of the archive buffer
    #[error("Read of {len} bytes at {offset:#x} exceeds archive size {size}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    /// Entry references a parent that never appeared in the name stream
    #[error("Entry {id} ({name:?}) references unknown parent directory {parent_id}")]
    DanglingParent {
        id: u16,
        parent_id: u16,
        name: String,
    },

    /// Payload decoding failed
    #[error("Codec error: {0}")]
    Codec(#[from] dat_codec::CodecError),
}
