//! PKCS#7 padding against a fixed block size.

use crate::types::HexWardenError;

/// Block size used by the chunk pipeline.
pub const BLOCK_SIZE: usize = 16;

/// PKCS#7 padder. Pad length is always between 1 and the block size, so
/// padded output is never empty and always a block multiple.
#[derive(Debug, Clone, Copy)]
pub struct Padder {
    block_size: usize,
}

impl Padder {
    pub fn new(block_size: usize) -> Result<Self, HexWardenError> {
        if block_size == 0 || block_size > 255 {
            return Err(HexWardenError::PaddingFailed);
        }
        Ok(Self { block_size })
    }

    pub fn pad(&self, data: &[u8]) -> Vec<u8> {
        let pad_len = self.block_size - (data.len() % self.block_size);
        let mut out = Vec::with_capacity(data.len() + pad_len);
        out.extend_from_slice(data);
        out.resize(data.len() + pad_len, pad_len as u8);
        out
    }

    pub fn unpad(&self, data: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        if data.is_empty() || data.len() % self.block_size != 0 {
            return Err(HexWardenError::UnpaddingFailed);
        }

        let pad_len = data[data.len() - 1] as usize;
        if pad_len == 0 || pad_len > self.block_size || pad_len > data.len() {
            return Err(HexWardenError::UnpaddingFailed);
        }

        let (body, padding) = data.split_at(data.len() - pad_len);
        if padding.iter().any(|&b| b as usize != pad_len) {
            return Err(HexWardenError::UnpaddingFailed);
        }

        Ok(body.to_vec())
    }
}

impl Default for Padder {
    fn default() -> Self {
        Self { block_size: BLOCK_SIZE }
    }
}
