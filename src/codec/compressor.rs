//! Zlib compressor backed by flate2.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::Compressor;
use crate::error::{CacheDecodeError, CacheEncodeError};

// == Zlib ==
/// Zlib stream compression with a configurable level.
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    level: Compression,
}

impl ZlibCompressor {
    /// Level 0 (store) to 9 (best); values above 9 are clamped.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CacheEncodeError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(data).map_err(CacheEncodeError::new)?;
        encoder.finish().map_err(CacheEncodeError::new)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CacheDecodeError> {
        let mut decoder = ZlibDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(CacheDecodeError::new)?;
        Ok(out)
    }
}
