//! Codec Module
//!
//! Turns application values into storable payloads and back. A codec has two
//! optional slots: a serializer (value <-> bytes) and a compressor
//! (bytes <-> bytes). Compression only ever applies to serialized bytes.

mod compressor;
mod serializer;

use std::fmt;
use std::sync::Arc;

use crate::error::{CacheDecodeError, CacheEncodeError};

pub use compressor::ZlibCompressor;
pub use serializer::{JsonSerializer, MessagePackSerializer, RawSerializer};

// == Capability Traits ==
/// Converts values of type `V` to bytes and back.
pub trait Serializer<V>: Send + Sync {
    fn serialize(&self, value: &V) -> Result<Vec<u8>, CacheEncodeError>;

    /// Must fail with a `CacheDecodeError` on malformed input.
    fn deserialize(&self, payload: &[u8]) -> Result<V, CacheDecodeError>;
}

/// Byte-level compression applied after serialization.
pub trait Compressor: Send + Sync {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CacheEncodeError>;

    /// Must fail with a `CacheDecodeError` on malformed input.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CacheDecodeError>;
}

// == Payload ==
/// What a backend primitive stores for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<V> {
    /// The value itself; produced when no serializer is configured
    Value(V),
    /// Serialized (and possibly compressed) bytes
    Bytes(Vec<u8>),
}

// == Codec ==
/// Encode/decode pipeline with optional serializer and compressor slots.
pub struct Codec<V> {
    serializer: Option<Arc<dyn Serializer<V>>>,
    compressor: Option<Arc<dyn Compressor>>,
}

impl<V> Codec<V> {
    // == Constructor ==
    /// A codec with both slots empty: values pass through unchanged.
    pub fn passthrough() -> Self {
        Self {
            serializer: None,
            compressor: None,
        }
    }

    pub fn with_serializer(mut self, serializer: impl Serializer<V> + 'static) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    pub fn with_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Some(Arc::new(compressor));
        self
    }

    pub fn has_serializer(&self) -> bool {
        self.serializer.is_some()
    }

    pub fn has_compressor(&self) -> bool {
        self.compressor.is_some()
    }

    // == Encode ==
    /// Serializes, then compresses the serialized bytes.
    ///
    /// Without a serializer the value is returned as `Payload::Value` and the
    /// compressor, if any, is not invoked.
    pub fn encode(&self, value: V) -> Result<Payload<V>, CacheEncodeError> {
        let Some(serializer) = &self.serializer else {
            return Ok(Payload::Value(value));
        };

        let bytes = serializer.serialize(&value)?;
        match &self.compressor {
            Some(compressor) => Ok(Payload::Bytes(compressor.compress(&bytes)?)),
            None => Ok(Payload::Bytes(bytes)),
        }
    }

    // == Decode ==
    /// Decompresses, then deserializes. `Payload::Value` passes through.
    pub fn decode(&self, payload: Payload<V>) -> Result<V, CacheDecodeError> {
        let bytes = match payload {
            Payload::Value(value) => return Ok(value),
            Payload::Bytes(bytes) => bytes,
        };

        let bytes = match &self.compressor {
            Some(compressor) => compressor.decompress(&bytes)?,
            None => bytes,
        };

        match &self.serializer {
            Some(serializer) => serializer.deserialize(&bytes),
            None => Err(CacheDecodeError::new(
                "payload holds encoded bytes but no serializer is configured",
            )),
        }
    }

    /// Like [`Codec::decode`], returning `default` instead of an error.
    pub fn decode_or(&self, payload: Payload<V>, default: V) -> V {
        self.decode(payload).unwrap_or(default)
    }
}

impl<V> Default for Codec<V> {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl<V> Clone for Codec<V> {
    fn clone(&self) -> Self {
        Self {
            serializer: self.serializer.clone(),
            compressor: self.compressor.clone(),
        }
    }
}

impl<V> fmt::Debug for Codec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("serializer", &self.has_serializer())
            .field("compressor", &self.has_compressor())
            .finish()
    }
}
