//! Serializers
//!
//! Structured text (JSON), compact binary (MessagePack) and an identity
//! serializer for values that already are bytes or text.

use serde::{de::DeserializeOwned, Serialize};

use super::Serializer;
use crate::error::{CacheDecodeError, CacheEncodeError};

// == JSON ==
/// JSON serializer for any serde value.
///
/// Timestamps round-trip when the value type uses chrono's serde support.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<V> Serializer<V> for JsonSerializer
where
    V: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &V) -> Result<Vec<u8>, CacheEncodeError> {
        serde_json::to_vec(value).map_err(CacheEncodeError::new)
    }

    fn deserialize(&self, payload: &[u8]) -> Result<V, CacheDecodeError> {
        serde_json::from_slice(payload).map_err(CacheDecodeError::new)
    }
}

// == MessagePack ==
/// Binary object serializer backed by MessagePack.
///
/// Struct fields are written by name so payloads survive field reordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackSerializer;

impl<V> Serializer<V> for MessagePackSerializer
where
    V: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &V) -> Result<Vec<u8>, CacheEncodeError> {
        rmp_serde::to_vec_named(value).map_err(CacheEncodeError::new)
    }

    fn deserialize(&self, payload: &[u8]) -> Result<V, CacheDecodeError> {
        rmp_serde::from_slice(payload).map_err(CacheDecodeError::new)
    }
}

// == Raw ==
/// Identity serializer for `Vec<u8>` and `String` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSerializer;

impl Serializer<Vec<u8>> for RawSerializer {
    fn serialize(&self, value: &Vec<u8>) -> Result<Vec<u8>, CacheEncodeError> {
        Ok(value.clone())
    }

    fn deserialize(&self, payload: &[u8]) -> Result<Vec<u8>, CacheDecodeError> {
        Ok(payload.to_vec())
    }
}

impl Serializer<String> for RawSerializer {
    fn serialize(&self, value: &String) -> Result<Vec<u8>, CacheEncodeError> {
        Ok(value.as_bytes().to_vec())
    }

    fn deserialize(&self, payload: &[u8]) -> Result<String, CacheDecodeError> {
        String::from_utf8(payload.to_vec()).map_err(CacheDecodeError::new)
    }
}
