//! Payload decoders for TT-era DAT archives
//!
//! Compressed payloads in a DAT archive start with a 4-byte ASCII
//! signature naming the compression scheme. This crate provides the
//! decoder trait, the signature-keyed registry, and the two schemes
//! observed in shipped archives (`ZIPX`, `LZ2K`).

pub mod error;
pub mod lz2k;
pub mod registry;
pub mod zipx;

pub use error::{CodecError, Result};
pub use lz2k::Lz2k;
pub use registry::{Codec, CodecRegistry, SIGNATURE_LEN};
pub use zipx::Zipx;
