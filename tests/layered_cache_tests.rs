//! Integration Tests for the Layered Cache
//!
//! Drives the public API end to end against the in-process store.

use chrono::{DateTime, TimeZone, Utc};
use layercache::cache::{Cache, LayeredCache, RemoteTtlCache, Scoped, Ttl, TtlCache};
use layercache::codec::{Codec, JsonSerializer, MessagePackSerializer, ZlibCompressor};
use layercache::config::{CompressorKind, Config, SerializerKind};
use layercache::error::{InvalidInput, LookupError, ScopeError};
use layercache::store::MemoryStore;
use serde::{Deserialize, Serialize};
use std::thread::sleep;
use std::time::Duration;

// == Helper Functions ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    user: String,
    roles: Vec<String>,
    issued_at: DateTime<Utc>,
}

type SessionCache = LayeredCache<RemoteTtlCache<MemoryStore, Session>>;

fn session(user: &str) -> Session {
    Session {
        user: user.to_string(),
        roles: vec!["reader".to_string(), "writer".to_string()],
        issued_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
    }
}

fn create_cache(codec: Codec<Session>) -> SessionCache {
    LayeredCache::new(RemoteTtlCache::new(
        MemoryStore::new(),
        "sessions",
        Ttl::from_secs(300),
        codec,
    ))
}

fn json_cache() -> SessionCache {
    create_cache(Codec::passthrough().with_serializer(JsonSerializer))
}

fn remote_lookups(cache: &SessionCache) -> u64 {
    cache.remote().client().stats().lookups()
}

// == Round Trip Tests ==

#[test]
fn test_structured_value_roundtrip_json() {
    let mut cache = json_cache();

    cache.set("s1", session("ada"), Some(60.0)).unwrap();

    assert_eq!(cache.get("s1").unwrap(), Some(session("ada")));
    let ttl = cache.remote().client().ttl("sessions:s1").unwrap();
    assert!((59..=60).contains(&ttl));
}

#[test]
fn test_structured_value_roundtrip_msgpack_zlib() {
    let mut cache = create_cache(
        Codec::passthrough()
            .with_serializer(MessagePackSerializer)
            .with_compressor(ZlibCompressor::with_level(9)),
    );

    cache
        .set_many(vec![("a", session("ada")), ("b", session("bob"))], None)
        .unwrap();

    let result = cache.get_many(&["a", "b", "c"]).unwrap();
    assert_eq!(result["a"], Some(session("ada")));
    assert_eq!(result["b"], Some(session("bob")));
    assert_eq!(result["c"], None);
}

#[test]
fn test_codec_from_config() {
    let config = Config {
        prefix: "cfg".to_string(),
        serializer: SerializerKind::MessagePack,
        compressor: CompressorKind::Zlib,
        ..Config::default()
    };
    let remote = RemoteTtlCache::new(
        MemoryStore::new(),
        config.prefix.clone(),
        config.default_ttl,
        config.codec::<Session>().unwrap(),
    );
    let mut cache = LayeredCache::new(remote);

    cache.set("s1", session("cy"), None).unwrap();

    assert_eq!(cache.get("s1").unwrap(), Some(session("cy")));
    assert!(cache.remote().client().ttl("cfg:s1").is_some());
}

// == Scope Tests ==

#[test]
fn test_scope_serves_local_then_remote() {
    let mut cache = json_cache();

    {
        let mut request = cache.scope();
        request.set("s1", session("ada"), Some(60.0)).unwrap();
        assert_eq!(request.get("s1").unwrap(), Some(session("ada")));
        assert_eq!(remote_lookups(&request), 0);
    }

    assert!(cache.check_exited().is_ok());
    assert_eq!(cache.get("s1").unwrap(), Some(session("ada")));
    assert_eq!(remote_lookups(&cache), 1);
}

#[test]
fn test_scoped_batch_read_sends_only_misses() {
    let mut cache = json_cache();
    cache.set("k1", session("one"), None).unwrap();

    let mut request = cache.scope();
    request.set("k2", session("two"), None).unwrap();
    request.set("k3", session("three"), None).unwrap();

    let result = request.get_many(&["k1", "k2", "k3", "k4"]).unwrap();

    assert_eq!(remote_lookups(&request), 2);
    assert_eq!(result.len(), 4);
    assert_eq!(result["k1"], Some(session("one")));
    assert_eq!(result["k2"], Some(session("two")));
    assert_eq!(result["k3"], Some(session("three")));
    assert_eq!(result["k4"], None);
}

#[test]
fn test_scope_exits_when_work_panics() {
    let mut cache = json_cache();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut request = cache.scope();
        request.set("s1", session("ada"), None).unwrap();
        panic!("request handler failed");
    }));

    assert!(outcome.is_err());
    assert!(!cache.is_active());
    assert!(cache.local().is_empty());
    assert!(cache.check_exited().is_ok());
}

#[test]
fn test_check_exited_reports_leaked_scope() {
    let mut cache = json_cache();
    cache.enter();
    cache.enter();
    cache.set("s1", session("ada"), None).unwrap();

    assert_eq!(
        cache.check_exited(),
        Err(ScopeError::StillActive { depth: 2 })
    );
    assert!(!cache.is_active());
    assert!(cache.local().is_empty());
    // the write still went through to the remote
    assert_eq!(cache.get("s1").unwrap(), Some(session("ada")));
}

// == Remove Tests ==

#[test]
fn test_remove_and_item_access() {
    let mut cache = json_cache();
    cache.set("s1", session("ada"), None).unwrap();

    assert_eq!(cache.fetch("s1").unwrap(), session("ada"));
    assert!(cache.delete("s1").is_ok());
    assert_eq!(
        cache.fetch("s1"),
        Err(LookupError::NotFound("s1".to_string()))
    );
    assert_eq!(
        cache.delete("s1"),
        Err(LookupError::NotFound("s1".to_string()))
    );
}

#[test]
fn test_remove_many_counts_remote_hits() {
    let mut cache = json_cache();
    cache
        .set_many(
            vec![("a", session("a")), ("b", session("b")), ("d", session("d"))],
            None,
        )
        .unwrap();

    assert_eq!(cache.remove_many(&["a", "b", "c", "d", "e"]).unwrap(), 3);
    assert!(cache.remote().client().is_empty());
}

// == Expiry Tests ==

#[test]
fn test_entries_expire_remotely() {
    let mut cache = json_cache();

    cache.set("short", session("ada"), Some(0.2)).unwrap();
    assert_eq!(cache.get("short").unwrap(), Some(session("ada")));

    sleep(Duration::from_millis(1100));

    assert_eq!(cache.get("short").unwrap(), None);
    assert_eq!(
        cache.get_or("short", session("fallback")).unwrap(),
        session("fallback")
    );
}

// == Validation Tests ==

#[test]
fn test_invalid_input_reaches_caller() {
    let mut cache = json_cache();

    assert_eq!(cache.get(""), Err(InvalidInput::EmptyKey));
    assert_eq!(
        cache.set("k", session("ada"), Some(-1.0)),
        Err(InvalidInput::TtlOutOfRange(-1.0))
    );
    assert_eq!(
        "soon".parse::<Ttl>(),
        Err(InvalidInput::TtlNotNumeric("soon".to_string()))
    );
    assert!(cache.remote().client().is_empty());
    assert_eq!(remote_lookups(&cache), 0);
}

#[test]
fn test_corrupt_remote_entry_reads_as_miss() {
    use layercache::cache::RemoteClient;

    let mut store = MemoryStore::new();
    store.set("sessions:bad", b"not json", 60).unwrap();
    let mut cache: SessionCache = LayeredCache::new(RemoteTtlCache::new(
        store,
        "sessions",
        Ttl::from_secs(300),
        Codec::passthrough().with_serializer(JsonSerializer),
    ));

    assert_eq!(cache.get("bad").unwrap(), None);
}
