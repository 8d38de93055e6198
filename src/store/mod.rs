//! Store Module
//!
//! Concrete key-value services behind `RemoteClient`: a Redis connection and
//! an in-process expiring store.

mod entry;
mod memory;
mod redis_client;
mod stats;

pub use entry::StoreEntry;
pub use memory::MemoryStore;
pub use redis_client::RedisClient;
pub use stats::StoreStats;
