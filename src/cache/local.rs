//! Local Context Cache Module
//!
//! An in-memory store that only holds entries while a scope is active.
//! Values are kept as given (passthrough codec) and never expire on their
//! own; the whole store is flushed when the outermost scope exits.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheBackend, NoTtlBackend, Region, Scoped};
use crate::codec::{Codec, Payload};
use crate::error::{Result, ScopeError};

// == Local Context Cache ==
/// Request-scoped store. Outside a scope every read misses and every write
/// is dropped.
#[derive(Debug)]
pub struct LocalContextCache<V> {
    /// Entries written during the current scope
    entries: HashMap<String, Payload<V>>,
    /// Scope depth tracking
    region: Region,
    codec: Codec<V>,
}

impl<V> LocalContextCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            region: Region::new(),
            codec: Codec::passthrough(),
        }
    }

    /// Number of entries held by the current scope.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.region.is_active() && self.entries.contains_key(key)
    }

    fn flush(&mut self) {
        if !self.entries.is_empty() {
            debug!("Flushing {} scoped cache entries", self.entries.len());
        }
        self.entries.clear();
    }
}

impl<V> Default for LocalContextCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + 'static> CacheBackend for LocalContextCache<V> {
    type Value = V;

    fn codec(&self) -> &Codec<V> {
        &self.codec
    }

    fn raw_get(&mut self, key: &str) -> Result<Option<Payload<V>>> {
        if !self.region.is_active() {
            return Ok(None);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn raw_remove(&mut self, key: &str) -> Result<bool> {
        if !self.region.is_active() {
            return Ok(false);
        }
        Ok(self.entries.remove(key).is_some())
    }
}

impl<V: Clone + 'static> NoTtlBackend for LocalContextCache<V> {
    fn raw_set(&mut self, key: &str, payload: Payload<V>) -> Result<()> {
        if self.region.is_active() {
            self.entries.insert(key.to_string(), payload);
        }
        Ok(())
    }
}

impl<V> Scoped for LocalContextCache<V> {
    fn enter(&mut self) {
        self.region.enter();
    }

    fn exit(&mut self) {
        if self.region.exit() {
            self.flush();
        }
    }

    fn depth(&self) -> usize {
        self.region.depth()
    }

    fn check_exited(&mut self) -> std::result::Result<(), ScopeError> {
        match self.region.reset() {
            0 => Ok(()),
            depth => {
                self.flush();
                Err(ScopeError::StillActive { depth })
            }
        }
    }
}
