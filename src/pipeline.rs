//! Per-chunk transformation (compress, pad, seal, erasure-code) and its
//! exact inverse.

use crate::compress::Compressor;
use crate::crypto::{AesCipher, NONCE_LEN, TAG_LEN};
use crate::erasure::Encoder;
use crate::padding::{Padder, BLOCK_SIZE};
use crate::types::{HexWardenError, KEY_SIZE};

/// Smallest possible sealed payload: nonce, tag, and one padded block.
const MIN_SEALED_LEN: usize = NONCE_LEN + TAG_LEN + BLOCK_SIZE;

/// Composes the primitive stages into a chunk encryptor/decryptor.
///
/// All members are immutable after construction, so one pipeline can be
/// shared across worker threads.
pub struct ChunkPipeline {
    cipher: AesCipher,
    coder: Encoder,
    compressor: Compressor,
    padder: Padder,
}

impl ChunkPipeline {
    /// Build a pipeline from a derived key. At least 32 bytes are required;
    /// only the first 32 are used.
    pub fn new(key: &[u8]) -> Result<Self, HexWardenError> {
        if key.len() < KEY_SIZE {
            return Err(HexWardenError::InvalidKeySize);
        }
        Ok(Self {
            cipher: AesCipher::new(&key[..KEY_SIZE])?,
            coder: Encoder::with_defaults()?,
            compressor: Compressor::default(),
            padder: Padder::default(),
        })
    }

    pub fn encrypt_chunk(&self, chunk: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        let compressed = self.compressor.compress(chunk)?;
        let padded = self.padder.pad(&compressed);
        let sealed = self.cipher.encrypt(&padded)?;
        self.coder.encode(&sealed)
    }

    pub fn decrypt_chunk(&self, data: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        let decoded = self.coder.decode(data)?;
        let opened = self.open_sealed(&decoded)?;
        let unpadded = self.padder.unpad(&opened)?;
        self.compressor.decompress(&unpadded)
    }

    /// Open a decoded buffer whose tail may carry the zero extension added
    /// by the shard splitter.
    ///
    /// The extension is at most `k - 1` bytes, so the true ciphertext is
    /// found by attempting the full buffer and shortening one byte at a
    /// time; GCM rejects every wrong candidate.
    fn open_sealed(&self, decoded: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        let floor = decoded
            .len()
            .saturating_sub(self.coder.data_shards() - 1)
            .max(MIN_SEALED_LEN);

        let mut end = decoded.len();
        while end >= floor {
            if let Ok(plaintext) = self.cipher.decrypt(&decoded[..end]) {
                return Ok(plaintext);
            }
            end -= 1;
        }
        Err(HexWardenError::DecryptionFailed)
    }
}
