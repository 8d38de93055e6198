//! Layered Cache Module
//!
//! A request-scoped local store laid over a remote TTL cache. The remote
//! cache is always the durable source of truth: every write goes through to
//! it, and removals report what the remote said. While a scope is active,
//! values written in that scope are mirrored locally so later reads in the
//! same unit of work skip the round trip.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::cache::contract::{collect_entries, validate_key, validate_keys};
use crate::cache::{Cache, LocalContextCache, NoTtlCache, Scoped, TtlCache};
use crate::error::{InvalidInput, ScopeError};

// == Layered Cache ==
/// Local-over-remote composite cache.
///
/// # Example
/// ```ignore
/// let mut cache = LayeredCache::new(remote);
/// {
///     let mut request = cache.scope();
///     request.set("user:1", user, Some(60.0))?;
///     let again = request.get("user:1")?; // served locally
/// }
/// ```
pub struct LayeredCache<R: TtlCache> {
    remote: R,
    local: LocalContextCache<R::Value>,
}

impl<R: TtlCache + fmt::Debug> fmt::Debug for LayeredCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredCache")
            .field("remote", &self.remote)
            .field("depth", &self.local.depth())
            .field("local_entries", &self.local.len())
            .finish()
    }
}

impl<R> LayeredCache<R>
where
    R: TtlCache,
    R::Value: 'static,
{
    // == Constructor ==
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            local: LocalContextCache::new(),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    pub fn local(&self) -> &LocalContextCache<R::Value> {
        &self.local
    }

    /// Gives back the remote cache, dropping any scope state.
    pub fn into_remote(self) -> R {
        self.remote
    }
}

impl<R> Cache for LayeredCache<R>
where
    R: TtlCache,
    R::Value: 'static,
{
    type Value = R::Value;

    // == Get ==
    /// Serves from the local store when a scope is active and the key was
    /// written in it; otherwise asks the remote cache.
    fn get(&mut self, key: &str) -> Result<Option<Self::Value>, InvalidInput> {
        validate_key(key)?;

        if self.local.is_active() {
            if let Some(value) = self.local.get(key)? {
                return Ok(Some(value));
            }
        }
        self.remote.get(key)
    }

    // == Get Many ==
    /// At most one remote batch call, for the keys the local store could
    /// not answer. No remote call when every key is local.
    fn get_many<K: AsRef<str>>(
        &mut self,
        keys: &[K],
    ) -> Result<HashMap<String, Option<Self::Value>>, InvalidInput> {
        let keys = validate_keys(keys)?;
        if !self.local.is_active() {
            return self.remote.get_many(keys.as_slice());
        }

        let mut found = HashMap::with_capacity(keys.len());
        let mut remaining = Vec::new();
        for key in keys {
            match self.local.get(key)? {
                Some(value) => {
                    found.insert(key.to_string(), Some(value));
                }
                None => remaining.push(key),
            }
        }

        if !remaining.is_empty() {
            debug!(
                "Layered get_many: {} local hits, {} keys sent to remote",
                found.len(),
                remaining.len()
            );
            found.extend(self.remote.get_many(remaining.as_slice())?);
        }
        Ok(found)
    }

    // == Remove ==
    /// Removes from both layers. The remote report decides the result.
    fn remove(&mut self, key: &str) -> Result<bool, InvalidInput> {
        validate_key(key)?;

        let local_existed = self.local.remove(key)?;
        let remote_existed = self.remote.remove(key)?;
        if local_existed && !remote_existed {
            debug!("Key {} existed only in the local scope", key);
        }
        Ok(remote_existed)
    }
}

impl<R> TtlCache for LayeredCache<R>
where
    R: TtlCache,
    R::Value: 'static,
{
    // == Set ==
    /// Writes through to the remote cache, and mirrors locally when a scope
    /// is active.
    fn set(&mut self, key: &str, value: Self::Value, ttl: Option<f64>) -> Result<(), InvalidInput> {
        if self.local.is_active() {
            self.remote.set(key, value.clone(), ttl)?;
            self.local.set(key, value)
        } else {
            self.remote.set(key, value, ttl)
        }
    }

    fn set_many<I, K>(&mut self, entries: I, ttl: Option<f64>) -> Result<(), InvalidInput>
    where
        I: IntoIterator<Item = (K, Self::Value)>,
        K: Into<String>,
    {
        let entries = collect_entries(entries)?;
        if !self.local.is_active() {
            return self.remote.set_many(entries, ttl);
        }

        self.remote.set_many(entries.clone(), ttl)?;
        self.local.set_many(entries)
    }
}

impl<R> Scoped for LayeredCache<R>
where
    R: TtlCache,
    R::Value: 'static,
{
    fn enter(&mut self) {
        self.local.enter();
    }

    fn exit(&mut self) {
        self.local.exit();
    }

    fn depth(&self) -> usize {
        self.local.depth()
    }

    fn check_exited(&mut self) -> Result<(), ScopeError> {
        self.local.check_exited()
    }
}
