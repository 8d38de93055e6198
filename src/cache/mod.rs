//! Cache Module
//!
//! The cache contract, its remote and scoped-local backends, and the
//! local-over-remote composite built from them.

mod contract;
mod layered;
mod local;
mod remote;
mod scope;
mod ttl;


// Re-export public types
pub use contract::{
    validate_key, validate_keys, Cache, CacheBackend, NoTtlBackend, NoTtlCache, TtlBackend,
    TtlCache,
};
pub use layered::LayeredCache;
pub use local::LocalContextCache;
pub use remote::{RemoteClient, RemoteTtlCache};
pub use scope::{Region, Scope, Scoped};
pub use ttl::Ttl;
