//! Redis Client Module
//!
//! Blocking Redis connection exposed as a [`RemoteClient`].

use redis::{Client, Connection, RedisError};
use tracing::info;

use crate::cache::RemoteClient;

// == Redis Client ==
pub struct RedisClient {
    conn: Connection,
}

impl RedisClient {
    /// Connects to the server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub fn open(url: &str) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let conn = client.get_connection()?;
        info!("Connected to Redis at {}", url);
        Ok(Self { conn })
    }

    /// Wraps an already established connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient").finish_non_exhaustive()
    }
}

impl RemoteClient for RedisClient {
    type Error = RedisError;

    fn set(&mut self, wire_key: &str, payload: &[u8], expire_secs: u64) -> Result<(), RedisError> {
        redis::cmd("SET")
            .arg(wire_key)
            .arg(payload)
            .arg("EX")
            .arg(expire_secs)
            .query(&mut self.conn)
    }

    fn get(&mut self, wire_key: &str) -> Result<Option<Vec<u8>>, RedisError> {
        redis::cmd("GET").arg(wire_key).query(&mut self.conn)
    }

    fn batch_get(&mut self, wire_keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, RedisError> {
        if wire_keys.is_empty() {
            return Ok(Vec::new());
        }
        redis::cmd("MGET").arg(wire_keys).query(&mut self.conn)
    }

    fn delete(&mut self, wire_key: &str) -> Result<u64, RedisError> {
        redis::cmd("DEL").arg(wire_key).query(&mut self.conn)
    }
}
