//! layercache - round-trip probe against a live Redis
//!
//! Writes a probe key inside a scope, reads it back from the local layer,
//! exits the scope, reads it from Redis and removes it.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use layercache::{Cache, Config, LayeredCache, RedisClient, RemoteTtlCache, Scoped, TtlCache};

/// Main entry point for the cache probe.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to Redis and build the layered cache
/// 4. Run the probe and report the outcome
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "layercache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting layercache probe");

    let config = Config::from_env();
    info!(
        "Configuration loaded: prefix={}, default_ttl={}, serializer={}, compressor={}",
        config.prefix, config.default_ttl, config.serializer, config.compressor
    );

    let client = RedisClient::open(&config.redis_url)
        .with_context(|| format!("failed to connect to {}", config.redis_url))?;
    let remote = RemoteTtlCache::new(
        client,
        config.prefix.clone(),
        config.default_ttl,
        config.text_codec(),
    );
    let mut cache = LayeredCache::new(remote);

    let key = format!("probe:{}", Utc::now().timestamp_millis());
    let value = format!("written at {}", Utc::now().to_rfc3339());

    {
        let mut scope = cache.scope();
        scope.set(&key, value.clone(), Some(30.0))?;
        let local = scope.get(&key)?;
        info!("Read inside scope: {:?}", local);
        if local.as_deref() != Some(value.as_str()) {
            bail!("scoped read did not return the probe value");
        }
    }
    cache.check_exited()?;

    match cache.get(&key)? {
        Some(remote) if remote == value => info!("Read from Redis after scope exit: ok"),
        Some(other) => bail!("Redis returned a different value: {other:?}"),
        None => bail!("probe key not found in Redis; check the connection and serializer"),
    }

    if !cache.remove(&key)? {
        warn!("Probe key {} was already gone before removal", key);
    }

    info!("Probe complete");
    Ok(())
}
