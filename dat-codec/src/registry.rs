//! Signature-keyed decoder registry
//!
//! Compressed payloads start with a 4-byte ASCII signature naming the
//! compression scheme. A registry maps signatures to decoder instances;
//! callers construct one and pass it wherever extraction happens. There
//! is no process-global registry.

use std::collections::HashMap;

use tracing::trace;

use crate::{CodecError, Result, lz2k::Lz2k, zipx::Zipx};

/// Length of the format signature at the start of a compressed payload
pub const SIGNATURE_LEN: usize = 4;

/// A payload decoder for one compression scheme
pub trait Codec {
    /// Scheme name as it appears in the signature
    fn name(&self) -> &'static str;

    /// Decode `data`, the payload bytes after the signature
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Maps 4-byte payload signatures to decoders
pub struct CodecRegistry {
    codecs: HashMap<[u8; SIGNATURE_LEN], Box<dyn Codec>>,
}

impl CodecRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Create a registry with the schemes observed in shipped archives
    pub fn with_default_codecs() -> Self {
        let mut registry = Self::new();
        registry.register(*b"ZIPX", Box::new(Zipx));
        registry.register(*b"LZ2K", Box::new(Lz2k));
        registry
    }

    /// Register a decoder for `signature`, replacing any existing one
    pub fn register(&mut self, signature: [u8; SIGNATURE_LEN], codec: Box<dyn Codec>) {
        self.codecs.insert(signature, codec);
    }

    /// Whether a decoder is registered for `signature`
    pub fn contains(&self, signature: &[u8; SIGNATURE_LEN]) -> bool {
        self.codecs.contains_key(signature)
    }

    /// Decode a complete compressed payload, signature included
    ///
    /// Returns [`CodecError::Truncated`] when the payload cannot hold a
    /// signature and [`CodecError::UnknownFormat`] when no decoder is
    /// registered for it. Both leave the payload undecoded.
    pub fn decode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() < SIGNATURE_LEN {
            return Err(CodecError::Truncated {
                expected: SIGNATURE_LEN,
                actual: payload.len(),
            });
        }

        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&payload[..SIGNATURE_LEN]);

        let codec = self
            .codecs
            .get(&signature)
            .ok_or(CodecError::UnknownFormat(signature))?;

        trace!(
            "Decoding {} payload bytes with {}",
            payload.len() - SIGNATURE_LEN,
            codec.name()
        );

        codec.decode(&payload[SIGNATURE_LEN..])
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
