//! Reed-Solomon erasure coding over equally sized byte shards.

use reed_solomon_erasure::galois_8::ReedSolomon;

use crate::types::HexWardenError;

/// Default number of data shards.
pub const DATA_SHARDS: usize = 4;

/// Default number of parity shards.
pub const PARITY_SHARDS: usize = 10;

/// Maximum input length accepted by [`Encoder::encode`] (1 GiB).
pub const MAX_DATA_LEN: usize = 1 << 30;

/// Systematic `(k, m)` Reed-Solomon coder.
///
/// `encode` splits the input across `k` equally sized data shards (the last
/// one zero-extended), appends `m` parity shards, and concatenates all of
/// them; the output length is always a multiple of `k + m`. Up to `m` lost
/// shards can be rebuilt through [`Encoder::reconstruct`].
pub struct Encoder {
    data_shards: usize,
    parity_shards: usize,
    codec: ReedSolomon,
}

impl Encoder {
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self, HexWardenError> {
        if data_shards == 0 || parity_shards == 0 {
            return Err(HexWardenError::EncodingFailed);
        }
        let codec = ReedSolomon::new(data_shards, parity_shards)
            .map_err(|_| HexWardenError::EncodingFailed)?;
        Ok(Self {
            data_shards,
            parity_shards,
            codec,
        })
    }

    /// Coder with the default `(4, 10)` geometry.
    pub fn with_defaults() -> Result<Self, HexWardenError> {
        Self::new(DATA_SHARDS, PARITY_SHARDS)
    }

    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    pub fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Encode `data` into `k + m` concatenated shards.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        if data.is_empty() || data.len() > MAX_DATA_LEN {
            return Err(HexWardenError::EncodingFailed);
        }

        let shard_size = data.len().div_ceil(self.data_shards);
        let mut shards: Vec<Vec<u8>> = vec![vec![0u8; shard_size]; self.total_shards()];
        for (shard, chunk) in shards.iter_mut().zip(data.chunks(shard_size)) {
            shard[..chunk.len()].copy_from_slice(chunk);
        }

        self.codec
            .encode(&mut shards)
            .map_err(|_| HexWardenError::EncodingFailed)?;

        let mut out = Vec::with_capacity(shard_size * self.total_shards());
        for shard in &shards {
            out.extend_from_slice(shard);
        }
        Ok(out)
    }

    /// Recover the concatenated data shards from an encoded buffer.
    ///
    /// The caller is expected to know the original length; the result is
    /// `k * shard_size` bytes and may carry the zero extension added by
    /// [`Encoder::encode`].
    pub fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        let total = self.total_shards();
        if encoded.is_empty() || encoded.len() % total != 0 {
            return Err(HexWardenError::DecodingFailed);
        }

        let shard_size = encoded.len() / total;
        Ok(encoded[..shard_size * self.data_shards].to_vec())
    }

    /// Rebuild missing shards in place. `None` marks an erased shard; at most
    /// `m` erasures can be repaired, and every present shard must have the
    /// same length.
    pub fn reconstruct(&self, shards: &mut [Option<Vec<u8>>]) -> Result<(), HexWardenError> {
        if shards.len() != self.total_shards() {
            return Err(HexWardenError::DecodingFailed);
        }
        self.codec
            .reconstruct(shards)
            .map_err(|_| HexWardenError::DecodingFailed)
    }

    /// Split an encoded buffer into its `k + m` shards.
    pub fn split_shards(&self, encoded: &[u8]) -> Result<Vec<Vec<u8>>, HexWardenError> {
        let total = self.total_shards();
        if encoded.is_empty() || encoded.len() % total != 0 {
            return Err(HexWardenError::DecodingFailed);
        }
        let shard_size = encoded.len() / total;
        Ok(encoded.chunks(shard_size).map(|shard| shard.to_vec()).collect())
    }
}
