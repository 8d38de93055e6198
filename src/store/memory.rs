//! Memory Store Module
//!
//! In-process key-value service with per-entry expiry. Stands in for the
//! remote service in development and tests; it never fails.

use std::collections::HashMap;
use std::convert::Infallible;

use tracing::debug;

use crate::cache::RemoteClient;
use crate::store::{StoreEntry, StoreStats};

// == Memory Store ==
/// Expiring byte store. Expired entries are dropped lazily on lookup or by
/// [`MemoryStore::cleanup_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, StoreEntry>,
    stats: StoreStats,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Lookup ==
    /// Returns the live entry for `key`, removing it if it has expired.
    fn lookup(&mut self, key: &str) -> Option<Vec<u8>> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.record_hit();
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        self.stats.record_miss();
        None
    }

    /// Remaining lifetime of a live entry in seconds.
    pub fn ttl(&self, key: &str) -> Option<u64> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(StoreEntry::ttl_remaining)
    }

    // == Stats ==
    pub fn stats(&self) -> StoreStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();

        if removed > 0 {
            debug!("Swept {} expired entries", removed);
        }
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RemoteClient for MemoryStore {
    type Error = Infallible;

    fn set(&mut self, wire_key: &str, payload: &[u8], expire_secs: u64) -> Result<(), Infallible> {
        self.entries
            .insert(wire_key.to_string(), StoreEntry::new(payload.to_vec(), expire_secs));
        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    fn get(&mut self, wire_key: &str) -> Result<Option<Vec<u8>>, Infallible> {
        Ok(self.lookup(wire_key))
    }

    fn batch_get(&mut self, wire_keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, Infallible> {
        Ok(wire_keys.iter().map(|key| self.lookup(key)).collect())
    }

    fn delete(&mut self, wire_key: &str) -> Result<u64, Infallible> {
        let removed = match self.entries.remove(wire_key) {
            Some(entry) => u64::from(!entry.is_expired()),
            None => 0,
        };
        self.stats.set_total_entries(self.entries.len());
        Ok(removed)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = MemoryStore::new();

        store.set("key1", b"value1", 300).unwrap();

        assert_eq!(store.get("key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = MemoryStore::new();

        assert_eq!(store.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let mut store = MemoryStore::new();

        store.set("key1", b"value1", 1).unwrap();
        store.set("key1", b"value2", 300).unwrap();

        assert_eq!(store.get("key1").unwrap(), Some(b"value2".to_vec()));
        assert!(store.ttl("key1").unwrap() >= 299);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = MemoryStore::new();

        store.set("key1", b"value1", 300).unwrap();

        assert_eq!(store.delete("key1").unwrap(), 1);
        assert_eq!(store.delete("key1").unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_zero_expiry_is_never_visible() {
        let mut store = MemoryStore::new();

        store.set("key1", b"value1", 0).unwrap();

        assert_eq!(store.get("key1").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = MemoryStore::new();

        store.set("key1", b"value1", 1).unwrap();
        assert!(store.get("key1").unwrap().is_some());

        sleep(Duration::from_millis(1100));

        assert_eq!(store.get("key1").unwrap(), None);
        assert_eq!(store.delete("key1").unwrap(), 0);
    }

    #[test]
    fn test_store_batch_get_aligned() {
        let mut store = MemoryStore::new();
        store.set("b", b"2", 300).unwrap();

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let result = store.batch_get(&keys).unwrap();

        assert_eq!(result, vec![None, Some(b"2".to_vec()), None]);
    }

    #[test]
    fn test_store_stats() {
        let mut store = MemoryStore::new();

        store.set("key1", b"value1", 300).unwrap();
        store.get("key1").unwrap();
        store.get("nonexistent").unwrap();
        store
            .batch_get(&["key1".to_string(), "other".to_string()])
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = MemoryStore::new();

        store.set("key1", b"value1", 1).unwrap();
        store.set("key2", b"value2", 10).unwrap();

        sleep(Duration::from_millis(1100));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").unwrap().is_some());
    }
}
