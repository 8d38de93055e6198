//! layercache - A layered key-value cache facade
//!
//! A request-scoped local store laid over a remote TTL cache, with pluggable
//! serialization and compression and failure-tolerant semantics.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod store;

pub use cache::{
    Cache, LayeredCache, LocalContextCache, NoTtlCache, RemoteClient, RemoteTtlCache, Scoped,
    Ttl, TtlCache,
};
pub use codec::Codec;
pub use config::Config;
pub use error::{CacheError, InvalidInput, LookupError, ScopeError};
pub use store::{MemoryStore, RedisClient};
