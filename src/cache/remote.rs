//! Remote TTL Cache Module
//!
//! Cache backend over an external key-value service. Keys are namespaced as
//! `prefix:key` on the wire and every client failure is reported as a
//! `RemoteCacheCommError`.

use std::error::Error as StdError;

use crate::cache::{CacheBackend, Ttl, TtlBackend};
use crate::codec::{Codec, Payload};
use crate::error::{CacheEncodeError, RemoteCacheCommError, Result};

// == Remote Client ==
/// The operations a remote key-value service must offer.
pub trait RemoteClient {
    type Error: StdError + Send + Sync + 'static;

    fn set(&mut self, wire_key: &str, payload: &[u8], expire_secs: u64)
        -> std::result::Result<(), Self::Error>;

    fn get(&mut self, wire_key: &str) -> std::result::Result<Option<Vec<u8>>, Self::Error>;

    /// Results are aligned with `wire_keys`; absent keys are `None`.
    fn batch_get(
        &mut self,
        wire_keys: &[String],
    ) -> std::result::Result<Vec<Option<Vec<u8>>>, Self::Error>;

    /// Returns the number of keys removed (0 or 1).
    fn delete(&mut self, wire_key: &str) -> std::result::Result<u64, Self::Error>;
}

// == Remote TTL Cache ==
/// TTL cache stored in a remote service through a [`RemoteClient`].
#[derive(Debug)]
pub struct RemoteTtlCache<C, V> {
    client: C,
    prefix: String,
    /// Expiry applied when a write carries no TTL
    default_ttl: Ttl,
    codec: Codec<V>,
}

impl<C: RemoteClient, V> RemoteTtlCache<C, V> {
    // == Constructor ==
    /// # Arguments
    /// * `client` - Connection to the remote service
    /// * `prefix` - Namespace prepended to every key
    /// * `default_ttl` - Expiry for writes without an explicit TTL
    /// * `codec` - Encoding applied before values go over the wire
    pub fn new(client: C, prefix: impl Into<String>, default_ttl: Ttl, codec: Codec<V>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
            default_ttl,
            codec,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn default_ttl(&self) -> Ttl {
        self.default_ttl
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Key as it appears in the remote service.
    pub fn wire_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

impl<C: RemoteClient, V: Clone + 'static> CacheBackend for RemoteTtlCache<C, V> {
    type Value = V;

    fn codec(&self) -> &Codec<V> {
        &self.codec
    }

    fn raw_get(&mut self, key: &str) -> Result<Option<Payload<V>>> {
        let wire_key = self.wire_key(key);
        let raw = self
            .client
            .get(&wire_key)
            .map_err(|err| RemoteCacheCommError::new("get", err))?;
        Ok(raw.map(Payload::Bytes))
    }

    fn raw_get_many(&mut self, keys: &[&str]) -> Result<Vec<Option<Payload<V>>>> {
        let wire_keys: Vec<String> = keys.iter().map(|key| self.wire_key(key)).collect();
        let raw = self
            .client
            .batch_get(&wire_keys)
            .map_err(|err| RemoteCacheCommError::new("batch_get", err))?;
        Ok(raw
            .into_iter()
            .map(|entry| entry.map(Payload::Bytes))
            .collect())
    }

    fn raw_remove(&mut self, key: &str) -> Result<bool> {
        let wire_key = self.wire_key(key);
        let removed = self
            .client
            .delete(&wire_key)
            .map_err(|err| RemoteCacheCommError::new("delete", err))?;
        Ok(removed > 0)
    }
}

impl<C: RemoteClient, V: Clone + 'static> TtlBackend for RemoteTtlCache<C, V> {
    fn raw_set(&mut self, key: &str, payload: Payload<V>, ttl: Option<Ttl>) -> Result<()> {
        let bytes = match payload {
            Payload::Bytes(bytes) => bytes,
            Payload::Value(_) => {
                return Err(CacheEncodeError::new(
                    "remote cache needs encoded bytes; configure a serializer",
                )
                .into())
            }
        };

        let wire_key = self.wire_key(key);
        let expire = ttl.unwrap_or(self.default_ttl);
        self.client
            .set(&wire_key, &bytes, expire.as_secs())
            .map_err(|err| RemoteCacheCommError::new("set", err))?;
        Ok(())
    }
}
