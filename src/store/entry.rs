//! Store Entry Module
//!
//! A single stored payload with its expiry deadline.

use chrono::Utc;

// == Store Entry ==
/// Encoded bytes held by the in-process store.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored payload
    pub payload: Vec<u8>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl StoreEntry {
    // == Constructor ==
    /// # Arguments
    /// * `payload` - The bytes to store
    /// * `expire_secs` - Lifetime in seconds; 0 expires immediately
    pub fn new(payload: Vec<u8>, expire_secs: u64) -> Self {
        let now = current_timestamp_ms();
        let lifetime_ms = i64::try_from(expire_secs.saturating_mul(1000)).unwrap_or(i64::MAX);

        Self {
            payload,
            created_at: now,
            expires_at: now.saturating_add(lifetime_ms),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        u64::try_from(self.expires_at - current_timestamp_ms()).unwrap_or(0)
    }

    /// Remaining lifetime in whole seconds.
    pub fn ttl_remaining(&self) -> u64 {
        self.ttl_remaining_ms() / 1000
    }
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = StoreEntry::new(b"test_value".to_vec(), 60);

        assert_eq!(entry.payload, b"test_value");
        assert_eq!(entry.expires_at - entry.created_at, 60_000);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = StoreEntry::new(b"test_value".to_vec(), 1);

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = StoreEntry::new(b"test_value".to_vec(), 10);

        let remaining = entry.ttl_remaining();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
    }

    #[test]
    fn test_zero_lifetime_is_expired() {
        let entry = StoreEntry::new(b"test".to_vec(), 0);

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_huge_lifetime_saturates() {
        let entry = StoreEntry::new(Vec::new(), u64::MAX);

        assert_eq!(entry.expires_at, i64::MAX);
        assert!(!entry.is_expired());
    }
}
