//! Configuration Module
//!
//! Handles loading cache configuration from environment variables and
//! building the matching codec.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::cache::Ttl;
use crate::codec::{
    Codec, JsonSerializer, MessagePackSerializer, RawSerializer, ZlibCompressor,
};

// == Config Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown serializer {0:?}, expected json, msgpack, raw or none")]
    UnknownSerializer(String),

    #[error("unknown compressor {0:?}, expected zlib or none")]
    UnknownCompressor(String),

    /// The raw serializer only handles text and byte values
    #[error("the raw serializer cannot encode structured values")]
    RawNeedsText,
}

// == Serializer Kind ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerializerKind {
    #[default]
    Json,
    MessagePack,
    Raw,
    /// Values are kept as-is; only usable with in-process stores
    None,
}

impl FromStr for SerializerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "msgpack" | "messagepack" => Ok(Self::MessagePack),
            "raw" => Ok(Self::Raw),
            "none" => Ok(Self::None),
            _ => Err(ConfigError::UnknownSerializer(s.to_string())),
        }
    }
}

impl fmt::Display for SerializerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::MessagePack => "msgpack",
            Self::Raw => "raw",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

// == Compressor Kind ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressorKind {
    Zlib,
    #[default]
    None,
}

impl FromStr for CompressorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zlib" => Ok(Self::Zlib),
            "none" => Ok(Self::None),
            _ => Err(ConfigError::UnknownCompressor(s.to_string())),
        }
    }
}

impl fmt::Display for CompressorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zlib => f.write_str("zlib"),
            Self::None => f.write_str("none"),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Namespace prepended to every remote key
    pub prefix: String,
    /// Expiry for writes that carry no TTL
    pub default_ttl: Ttl,
    pub serializer: SerializerKind,
    pub compressor: CompressorKind,
    /// Remote service address
    pub redis_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unparseable values are logged and replaced by their default.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Remote key namespace (default: layercache)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds, fractions round up (default: 300)
    /// - `CACHE_SERIALIZER` - json, msgpack, raw or none (default: json)
    /// - `CACHE_COMPRESSOR` - zlib or none (default: none)
    /// - `REDIS_URL` - Redis address (default: redis://127.0.0.1:6379)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            prefix: env::var("CACHE_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.prefix),
            default_ttl: parse_var("CACHE_DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            serializer: parse_var("CACHE_SERIALIZER").unwrap_or(defaults.serializer),
            compressor: parse_var("CACHE_COMPRESSOR").unwrap_or(defaults.compressor),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
        }
    }

    // == Codec Builders ==
    /// Codec for any serde value. Fails for the raw serializer.
    pub fn codec<V>(&self) -> Result<Codec<V>, ConfigError>
    where
        V: Serialize + DeserializeOwned + 'static,
    {
        let codec = match self.serializer {
            SerializerKind::Json => Codec::passthrough().with_serializer(JsonSerializer),
            SerializerKind::MessagePack => {
                Codec::passthrough().with_serializer(MessagePackSerializer)
            }
            SerializerKind::Raw => return Err(ConfigError::RawNeedsText),
            SerializerKind::None => Codec::passthrough(),
        };
        Ok(self.apply_compressor(codec))
    }

    /// Codec for string values; every serializer kind applies.
    pub fn text_codec(&self) -> Codec<String> {
        let codec = match self.serializer {
            SerializerKind::Raw => Codec::passthrough().with_serializer(RawSerializer),
            SerializerKind::Json => Codec::passthrough().with_serializer(JsonSerializer),
            SerializerKind::MessagePack => {
                Codec::passthrough().with_serializer(MessagePackSerializer)
            }
            SerializerKind::None => Codec::passthrough(),
        };
        self.apply_compressor(codec)
    }

    fn apply_compressor<V>(&self, codec: Codec<V>) -> Codec<V> {
        match self.compressor {
            CompressorKind::Zlib => codec.with_compressor(ZlibCompressor::default()),
            CompressorKind::None => codec,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: "layercache".to_string(),
            default_ttl: Ttl::from_secs(300),
            serializer: SerializerKind::Json,
            compressor: CompressorKind::None,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

fn parse_var<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Ignoring {}: {}", name, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Payload;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.prefix, "layercache");
        assert_eq!(config.default_ttl, Ttl::from_secs(300));
        assert_eq!(config.serializer, SerializerKind::Json);
        assert_eq!(config.compressor, CompressorKind::None);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("CACHE_PREFIX", "probe");
        env::set_var("CACHE_DEFAULT_TTL", "12.5");
        env::set_var("CACHE_SERIALIZER", "MsgPack");
        env::set_var("CACHE_COMPRESSOR", "bogus");
        env::remove_var("REDIS_URL");

        let config = Config::from_env();
        assert_eq!(config.prefix, "probe");
        assert_eq!(config.default_ttl, Ttl::from_secs(13));
        assert_eq!(config.serializer, SerializerKind::MessagePack);
        assert_eq!(config.compressor, CompressorKind::None);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");

        env::remove_var("CACHE_PREFIX");
        env::remove_var("CACHE_DEFAULT_TTL");
        env::remove_var("CACHE_SERIALIZER");
        env::remove_var("CACHE_COMPRESSOR");

        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("json".parse::<SerializerKind>(), Ok(SerializerKind::Json));
        assert_eq!(" RAW ".parse::<SerializerKind>(), Ok(SerializerKind::Raw));
        assert_eq!("none".parse::<SerializerKind>(), Ok(SerializerKind::None));
        assert_eq!(
            "yaml".parse::<SerializerKind>(),
            Err(ConfigError::UnknownSerializer("yaml".to_string()))
        );
        assert_eq!("zlib".parse::<CompressorKind>(), Ok(CompressorKind::Zlib));
        assert_eq!(
            "lz4".parse::<CompressorKind>(),
            Err(ConfigError::UnknownCompressor("lz4".to_string()))
        );
        assert_eq!(SerializerKind::MessagePack.to_string(), "msgpack");
    }

    #[test]
    fn test_codec_for_structured_values() {
        let config = Config {
            compressor: CompressorKind::Zlib,
            ..Config::default()
        };

        let codec = config.codec::<Vec<u32>>().unwrap();
        assert!(codec.has_serializer());
        assert!(codec.has_compressor());

        let payload = codec.encode(vec![1, 2, 3]).unwrap();
        assert!(matches!(payload, Payload::Bytes(_)));
        assert_eq!(codec.decode(payload).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_raw_serializer_needs_text() {
        let config = Config {
            serializer: SerializerKind::Raw,
            ..Config::default()
        };

        assert!(matches!(
            config.codec::<Vec<u32>>(),
            Err(ConfigError::RawNeedsText)
        ));

        let codec = config.text_codec();
        assert_eq!(
            codec.encode("plain".to_string()).unwrap(),
            Payload::Bytes(b"plain".to_vec())
        );
    }
}
