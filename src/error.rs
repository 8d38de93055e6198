//! Error types for the cache facade
//!
//! Two families live here. `CacheError` and its parts are operational
//! failures that the public cache methods absorb (a flaky backend only
//! lowers the hit rate). `InvalidInput`, `LookupError` and `ScopeError` are
//! misuse signals that always reach the caller.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed low-level error kept as the source of a cache error.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Operational failures raised by backend primitives and the codec.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The remote backend call itself failed
    #[error(transparent)]
    Communication(#[from] RemoteCacheCommError),

    /// A stored payload could not be decompressed or deserialized
    #[error(transparent)]
    Decode(#[from] CacheDecodeError),

    /// A value could not be turned into a storable payload
    #[error(transparent)]
    Encode(#[from] CacheEncodeError),
}

// == Communication Error ==
/// Raised when a call to the remote key-value client fails.
#[derive(Error, Debug)]
#[error("remote cache {operation} failed: {source}")]
pub struct RemoteCacheCommError {
    operation: &'static str,
    #[source]
    source: BoxError,
}

impl RemoteCacheCommError {
    /// Wraps a client error raised during `operation`.
    pub fn new(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }

    /// Name of the client operation that failed (`get`, `set`, ...).
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

// == Decode Error ==
/// Raised when decompression or deserialization of a payload fails.
///
/// The originating error is kept for diagnostics and is available through
/// [`CacheDecodeError::cause`] or [`std::error::Error::source`].
#[derive(Error, Debug)]
#[error("failed to decode cached value: {source}")]
pub struct CacheDecodeError {
    #[source]
    source: BoxError,
}

impl CacheDecodeError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The low-level failure this error was raised from.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

// == Encode Error ==
/// Raised when serialization or compression of a value fails.
#[derive(Error, Debug)]
#[error("failed to encode value for caching: {source}")]
pub struct CacheEncodeError {
    #[source]
    source: BoxError,
}

impl CacheEncodeError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

// == Invalid Input ==
/// Caller misuse detected before any backend is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInput {
    /// Keys must be non-empty strings
    #[error("cache key must be a non-empty string")]
    EmptyKey,

    /// TTL text that cannot be read as a number
    #[error("ttl {0:?} cannot be interpreted as a number")]
    TtlNotNumeric(String),

    /// Negative, NaN or infinite TTL
    #[error("ttl must be a finite, non-negative number of seconds, got {0}")]
    TtlOutOfRange(f64),
}

// == Lookup Error ==
/// Error returned by item-style access (`fetch`/`delete`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error(transparent)]
    Invalid(#[from] InvalidInput),

    /// The key is not present in the cache
    #[error("Key not found: {0}")]
    NotFound(String),
}

// == Scope Error ==
/// Reported by `check_exited` when a scope was left open.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("cache scope is still active (depth {depth}); local state was discarded")]
    StillActive { depth: usize },
}

// == Result Type Alias ==
/// Convenience Result type for backend primitives.
pub type Result<T> = std::result::Result<T, CacheError>;
