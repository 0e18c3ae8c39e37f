//! gzip compression with a bounded-output decompressor.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::types::HexWardenError;

/// Default gzip level (balanced).
pub const DEFAULT_LEVEL: u32 = 6;

/// Upper bound on a single chunk's decompressed size (100 MiB), guarding
/// against compression bombs.
pub const MAX_DECOMPRESSED_LEN: usize = 100 * 1024 * 1024;

/// gzip compressor with a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct Compressor {
    level: Compression,
}

impl Compressor {
    /// Create a compressor; levels outside 0..=9 fall back to the default.
    pub fn new(level: u32) -> Self {
        let level = if level > 9 { DEFAULT_LEVEL } else { level };
        Self {
            level: Compression::new(level),
        }
    }

    /// Compress `data`. Empty input passes through unchanged.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), self.level);
        encoder
            .write_all(data)
            .map_err(|_| HexWardenError::CompressionFailed)?;
        encoder
            .finish()
            .map_err(|_| HexWardenError::CompressionFailed)
    }

    /// Decompress `data`, failing if the output would exceed
    /// [`MAX_DECOMPRESSED_LEN`]. Empty input passes through unchanged.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .take(MAX_DECOMPRESSED_LEN as u64 + 1)
            .read_to_end(&mut out)
            .map_err(|_| HexWardenError::DecompressionFailed)?;
        if out.len() > MAX_DECOMPRESSED_LEN {
            return Err(HexWardenError::DecompressionFailed);
        }
        Ok(out)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}
