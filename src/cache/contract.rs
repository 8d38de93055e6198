//! Cache Contract Module
//!
//! Two layers of traits. Backends implement the small `raw_*` primitive set
//! (`CacheBackend` plus `TtlBackend` or `NoTtlBackend`); the public `Cache`,
//! `TtlCache` and `NoTtlCache` traits are blanket-implemented on top of
//! them and own validation, encoding, default values and error containment.
//!
//! Containment rule: a `CacheError` coming out of a primitive or the codec is
//! logged and turned into a miss, a no-op, `false` or `0`. Only
//! `InvalidInput` (and `LookupError::NotFound` for item access) reaches the
//! caller.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cache::Ttl;
use crate::codec::{Codec, Payload};
use crate::error::{InvalidInput, LookupError, Result};

// == Validation ==
/// Rejects keys that cannot name a cache entry.
pub fn validate_key(key: &str) -> std::result::Result<(), InvalidInput> {
    if key.is_empty() {
        return Err(InvalidInput::EmptyKey);
    }
    Ok(())
}

/// Validates every key before any of them is used.
pub fn validate_keys<K: AsRef<str>>(keys: &[K]) -> std::result::Result<Vec<&str>, InvalidInput> {
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            validate_key(key).map(|_| key)
        })
        .collect()
}

// == Backend Primitives ==
/// Low-level operations every concrete cache supplies.
///
/// `Ok(None)` from a read means the key is absent; it is never confused
/// with a stored value.
pub trait CacheBackend {
    type Value: Clone + 'static;

    fn codec(&self) -> &Codec<Self::Value>;

    fn raw_get(&mut self, key: &str) -> Result<Option<Payload<Self::Value>>>;

    /// Results are aligned with `keys`. Defaults to one `raw_get` per key.
    fn raw_get_many(&mut self, keys: &[&str]) -> Result<Vec<Option<Payload<Self::Value>>>> {
        keys.iter().map(|key| self.raw_get(key)).collect()
    }

    /// Returns whether the key existed.
    fn raw_remove(&mut self, key: &str) -> Result<bool>;

    /// Returns how many keys existed. Defaults to one `raw_remove` per key.
    fn raw_remove_many(&mut self, keys: &[&str]) -> Result<usize> {
        let mut removed = 0;
        for key in keys {
            if self.raw_remove(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Write primitives for stores without expiry.
pub trait NoTtlBackend: CacheBackend {
    fn raw_set(&mut self, key: &str, payload: Payload<Self::Value>) -> Result<()>;

    fn raw_set_many(&mut self, entries: Vec<(String, Payload<Self::Value>)>) -> Result<()> {
        for (key, payload) in entries {
            self.raw_set(&key, payload)?;
        }
        Ok(())
    }
}

/// Write primitives for stores with per-entry expiry.
///
/// `ttl` is already rounded to whole seconds; `None` leaves the choice of
/// expiry to the backend.
pub trait TtlBackend: CacheBackend {
    fn raw_set(&mut self, key: &str, payload: Payload<Self::Value>, ttl: Option<Ttl>)
        -> Result<()>;

    fn raw_set_many(
        &mut self,
        entries: Vec<(String, Payload<Self::Value>)>,
        ttl: Option<Ttl>,
    ) -> Result<()> {
        for (key, payload) in entries {
            self.raw_set(&key, payload, ttl)?;
        }
        Ok(())
    }
}

// == Public Contract ==
/// Read and remove operations shared by every cache.
pub trait Cache {
    type Value: Clone;

    /// Returns the cached value, or `None` on a miss or backend failure.
    fn get(&mut self, key: &str) -> std::result::Result<Option<Self::Value>, InvalidInput>;

    /// Looks up every key; absent or unreadable entries map to `None`.
    fn get_many<K: AsRef<str>>(
        &mut self,
        keys: &[K],
    ) -> std::result::Result<HashMap<String, Option<Self::Value>>, InvalidInput>;

    /// Returns whether the key existed. Backend failures report `false`.
    fn remove(&mut self, key: &str) -> std::result::Result<bool, InvalidInput>;

    /// Returns how many keys existed. The default removes one key at a time.
    fn remove_many<K: AsRef<str>>(
        &mut self,
        keys: &[K],
    ) -> std::result::Result<usize, InvalidInput> {
        let keys = validate_keys(keys)?;
        let mut removed = 0;
        for key in keys {
            if self.remove(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn get_or(
        &mut self,
        key: &str,
        default: Self::Value,
    ) -> std::result::Result<Self::Value, InvalidInput> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    fn get_many_or<K: AsRef<str>>(
        &mut self,
        keys: &[K],
        default: Self::Value,
    ) -> std::result::Result<HashMap<String, Self::Value>, InvalidInput> {
        Ok(self
            .get_many(keys)?
            .into_iter()
            .map(|(key, value)| (key, value.unwrap_or_else(|| default.clone())))
            .collect())
    }

    // == Item Access ==
    /// Like `get`, but a miss is an error.
    fn fetch(&mut self, key: &str) -> std::result::Result<Self::Value, LookupError> {
        self.get(key)?
            .ok_or_else(|| LookupError::NotFound(key.to_string()))
    }

    /// Like `remove`, but removing an absent key is an error.
    fn delete(&mut self, key: &str) -> std::result::Result<(), LookupError> {
        if self.remove(key)? {
            Ok(())
        } else {
            Err(LookupError::NotFound(key.to_string()))
        }
    }
}

/// Caches whose writes carry an expiry.
pub trait TtlCache: Cache {
    /// Stores `value`; `ttl` is in seconds and is rounded up.
    fn set(
        &mut self,
        key: &str,
        value: Self::Value,
        ttl: Option<f64>,
    ) -> std::result::Result<(), InvalidInput>;

    /// Stores every entry with the same `ttl`. Later duplicates win.
    fn set_many<I, K>(&mut self, entries: I, ttl: Option<f64>) -> std::result::Result<(), InvalidInput>
    where
        I: IntoIterator<Item = (K, Self::Value)>,
        K: Into<String>;
}

/// Caches whose writes never expire.
pub trait NoTtlCache: Cache {
    fn set(&mut self, key: &str, value: Self::Value) -> std::result::Result<(), InvalidInput>;

    /// Accepts any source of pairs: a map, a vector of tuples, or several
    /// of them chained. Later duplicates win.
    fn set_many<I, K>(&mut self, entries: I) -> std::result::Result<(), InvalidInput>
    where
        I: IntoIterator<Item = (K, Self::Value)>,
        K: Into<String>;
}

// == Blanket Implementations ==
impl<B: CacheBackend> Cache for B {
    type Value = B::Value;

    fn get(&mut self, key: &str) -> std::result::Result<Option<Self::Value>, InvalidInput> {
        validate_key(key)?;

        let payload = match self.raw_get(key) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Cache get failed for key {}, treating as miss: {}", key, err);
                return Ok(None);
            }
        };

        Ok(payload.and_then(|payload| decode_entry(self.codec(), key, payload)))
    }

    fn get_many<K: AsRef<str>>(
        &mut self,
        keys: &[K],
    ) -> std::result::Result<HashMap<String, Option<Self::Value>>, InvalidInput> {
        let keys = validate_keys(keys)?;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let payloads = match self.raw_get_many(&keys) {
            Ok(payloads) => payloads,
            Err(err) => {
                warn!(
                    "Cache get_many failed for {} keys, treating as misses: {}",
                    keys.len(),
                    err
                );
                return Ok(keys.iter().map(|key| (key.to_string(), None)).collect());
            }
        };

        let codec = self.codec();
        let mut payloads = payloads.into_iter();
        Ok(keys
            .iter()
            .map(|key| {
                let value = payloads
                    .next()
                    .flatten()
                    .and_then(|payload| decode_entry(codec, key, payload));
                (key.to_string(), value)
            })
            .collect())
    }

    fn remove(&mut self, key: &str) -> std::result::Result<bool, InvalidInput> {
        validate_key(key)?;

        match self.raw_remove(key) {
            Ok(existed) => Ok(existed),
            Err(err) => {
                warn!("Cache remove failed for key {}: {}", key, err);
                Ok(false)
            }
        }
    }

    fn remove_many<K: AsRef<str>>(
        &mut self,
        keys: &[K],
    ) -> std::result::Result<usize, InvalidInput> {
        let keys = validate_keys(keys)?;
        if keys.is_empty() {
            return Ok(0);
        }

        match self.raw_remove_many(&keys) {
            Ok(removed) => Ok(removed),
            Err(err) => {
                warn!("Cache remove_many failed for {} keys: {}", keys.len(), err);
                Ok(0)
            }
        }
    }
}

impl<B: TtlBackend> TtlCache for B {
    fn set(
        &mut self,
        key: &str,
        value: Self::Value,
        ttl: Option<f64>,
    ) -> std::result::Result<(), InvalidInput> {
        validate_key(key)?;
        let ttl = Ttl::normalize(ttl)?;

        let payload = match self.codec().encode(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Cache set skipped for key {}: {}", key, err);
                return Ok(());
            }
        };

        if let Err(err) = self.raw_set(key, payload, ttl) {
            warn!("Cache set failed for key {}: {}", key, err);
        }
        Ok(())
    }

    fn set_many<I, K>(&mut self, entries: I, ttl: Option<f64>) -> std::result::Result<(), InvalidInput>
    where
        I: IntoIterator<Item = (K, Self::Value)>,
        K: Into<String>,
    {
        let entries = collect_entries(entries)?;
        let ttl = Ttl::normalize(ttl)?;
        if entries.is_empty() {
            return Ok(());
        }

        let payloads = encode_entries(self.codec(), entries);
        let count = payloads.len();
        if let Err(err) = self.raw_set_many(payloads, ttl) {
            warn!("Cache set_many failed for {} keys: {}", count, err);
        }
        Ok(())
    }
}

impl<B: NoTtlBackend> NoTtlCache for B {
    fn set(&mut self, key: &str, value: Self::Value) -> std::result::Result<(), InvalidInput> {
        validate_key(key)?;

        let payload = match self.codec().encode(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Cache set skipped for key {}: {}", key, err);
                return Ok(());
            }
        };

        if let Err(err) = self.raw_set(key, payload) {
            warn!("Cache set failed for key {}: {}", key, err);
        }
        Ok(())
    }

    fn set_many<I, K>(&mut self, entries: I) -> std::result::Result<(), InvalidInput>
    where
        I: IntoIterator<Item = (K, Self::Value)>,
        K: Into<String>,
    {
        let entries = collect_entries(entries)?;
        if entries.is_empty() {
            return Ok(());
        }

        let payloads = encode_entries(self.codec(), entries);
        let count = payloads.len();
        if let Err(err) = self.raw_set_many(payloads) {
            warn!("Cache set_many failed for {} keys: {}", count, err);
        }
        Ok(())
    }
}

// == Helpers ==
fn decode_entry<V>(codec: &Codec<V>, key: &str, payload: Payload<V>) -> Option<V> {
    match codec.decode(payload) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("Treating undecodable entry for key {} as miss: {}", key, err);
            None
        }
    }
}

/// Validates keys and folds duplicates, keeping first-seen order.
pub(crate) fn collect_entries<I, K, V>(
    entries: I,
) -> std::result::Result<Vec<(String, V)>, InvalidInput>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
{
    let mut collected: Vec<(String, V)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (key, value) in entries {
        let key = key.into();
        validate_key(&key)?;
        match positions.get(&key) {
            Some(&index) => collected[index].1 = value,
            None => {
                positions.insert(key.clone(), collected.len());
                collected.push((key, value));
            }
        }
    }

    Ok(collected)
}

/// Entries whose value fails to encode are skipped.
fn encode_entries<V>(codec: &Codec<V>, entries: Vec<(String, V)>) -> Vec<(String, Payload<V>)> {
    entries
        .into_iter()
        .filter_map(|(key, value)| match codec.encode(value) {
            Ok(payload) => Some((key, payload)),
            Err(err) => {
                warn!("Cache set_many skipped key {}: {}", key, err);
                None
            }
        })
        .collect()
}
