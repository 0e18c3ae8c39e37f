//! The fixed 128-byte authenticated file header.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! 0        4        36       44        60        92       124    128
//! |magic(4)|salt(32)|size(8) |nonce(16)|ihash(32)|auth(32)|crc(4)|
//! ```
//!
//! `ihash` is SHA-256 over magic..nonce; `auth` is HMAC-SHA256 under the
//! derived key over magic..ihash; `crc` is CRC32-IEEE over bytes 4..124.

use std::io::{self, Read, Write};

use getrandom::fill as getrandom;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::kdf;
use crate::types::{HexWardenError, SALT_SIZE};

/// File format magic bytes (format + version).
pub const MAGIC: &[u8; 4] = b"HWX2";

/// Header nonce length. This field is authenticated but reserved: chunk
/// AEAD nonces are generated per chunk, never taken from here.
pub const HEADER_NONCE_SIZE: usize = 16;

/// Serialized header length.
pub const HEADER_SIZE: usize = 128;

const ORIGINAL_SIZE_LEN: usize = 8;
const INTEGRITY_LEN: usize = 32;
const AUTH_LEN: usize = 32;

const SALT_OFFSET: usize = MAGIC.len();
const SIZE_OFFSET: usize = SALT_OFFSET + SALT_SIZE;
const NONCE_OFFSET: usize = SIZE_OFFSET + ORIGINAL_SIZE_LEN;
const INTEGRITY_OFFSET: usize = NONCE_OFFSET + HEADER_NONCE_SIZE;
const AUTH_OFFSET: usize = INTEGRITY_OFFSET + INTEGRITY_LEN;
const CHECKSUM_OFFSET: usize = AUTH_OFFSET + AUTH_LEN;

type HmacSha256 = Hmac<Sha256>;

/// Parsed or freshly built header. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    salt: [u8; SALT_SIZE],
    original_size: u64,
    nonce: [u8; HEADER_NONCE_SIZE],
    integrity_hash: [u8; INTEGRITY_LEN],
    auth_tag: [u8; AUTH_LEN],
}

impl Header {
    /// Build a header for a new file: validates the salt, draws a random
    /// nonce, and computes the integrity hash and authentication tag.
    pub fn new(salt: &[u8], original_size: u64, key: &[u8]) -> Result<Self, HexWardenError> {
        kdf::validate_salt(salt)?;
        if key.is_empty() {
            return Err(HexWardenError::Invalid("key cannot be empty"));
        }

        let mut nonce = [0u8; HEADER_NONCE_SIZE];
        getrandom(&mut nonce).map_err(|_| HexWardenError::Rng)?;

        let mut salt_arr = [0u8; SALT_SIZE];
        salt_arr.copy_from_slice(salt);

        let mut header = Self {
            salt: salt_arr,
            original_size,
            nonce,
            integrity_hash: [0u8; INTEGRITY_LEN],
            auth_tag: [0u8; AUTH_LEN],
        };
        header.integrity_hash = header.compute_integrity_hash();
        header.auth_tag = header.compute_auth_tag(key);
        Ok(header)
    }

    /// The KDF salt (caller-owned copy).
    pub fn salt(&self) -> [u8; SALT_SIZE] {
        self.salt
    }

    /// Plaintext length recorded at encryption time.
    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    /// The reserved header nonce (caller-owned copy).
    pub fn nonce(&self) -> [u8; HEADER_NONCE_SIZE] {
        self.nonce
    }

    /// Constant-time check of the stored authentication tag under `key`,
    /// then of the integrity hash. Must be called once during decryption,
    /// before any chunk is opened.
    pub fn verify_key(&self, key: &[u8]) -> Result<(), HexWardenError> {
        if key.is_empty() {
            return Err(HexWardenError::Invalid("key cannot be empty"));
        }

        let expected = self.compute_auth_tag(key);
        if !bool::from(self.auth_tag.ct_eq(&expected)) {
            return Err(HexWardenError::AuthFailure);
        }

        if self.integrity_hash != self.compute_integrity_hash() {
            return Err(HexWardenError::IntegrityFailure);
        }
        Ok(())
    }

    /// Serialize exactly [`HEADER_SIZE`] bytes to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), HexWardenError> {
        let buf = self.marshal();
        writer.write_all(&buf).map_err(|e| match e.kind() {
            io::ErrorKind::WriteZero => HexWardenError::IncompleteWrite,
            _ => HexWardenError::Io(e),
        })
    }

    /// Read and validate a header: magic (constant-time), CRC32, and
    /// integrity hash. The authentication tag is not checked here because it
    /// needs the derived key; see [`Header::verify_key`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, HexWardenError> {
        let mut buf = [0u8; HEADER_SIZE];
        reader.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => HexWardenError::IncompleteRead,
            _ => HexWardenError::Io(e),
        })?;
        Self::unmarshal(&buf)
    }

    fn marshal(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..SALT_OFFSET].copy_from_slice(MAGIC);
        buf[SALT_OFFSET..SIZE_OFFSET].copy_from_slice(&self.salt);
        buf[SIZE_OFFSET..NONCE_OFFSET].copy_from_slice(&self.original_size.to_be_bytes());
        buf[NONCE_OFFSET..INTEGRITY_OFFSET].copy_from_slice(&self.nonce);
        buf[INTEGRITY_OFFSET..AUTH_OFFSET].copy_from_slice(&self.integrity_hash);
        buf[AUTH_OFFSET..CHECKSUM_OFFSET].copy_from_slice(&self.auth_tag);

        let checksum = crc32fast::hash(&buf[SALT_OFFSET..CHECKSUM_OFFSET]);
        buf[CHECKSUM_OFFSET..].copy_from_slice(&checksum.to_be_bytes());
        buf
    }

    fn unmarshal(data: &[u8; HEADER_SIZE]) -> Result<Self, HexWardenError> {
        if !bool::from(data[..SALT_OFFSET].ct_eq(MAGIC)) {
            return Err(HexWardenError::InvalidMagic);
        }

        let computed = crc32fast::hash(&data[SALT_OFFSET..CHECKSUM_OFFSET]).to_be_bytes();
        if !bool::from(data[CHECKSUM_OFFSET..].ct_eq(&computed)) {
            return Err(HexWardenError::ChecksumMismatch);
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&data[SALT_OFFSET..SIZE_OFFSET]);

        let mut size_buf = [0u8; ORIGINAL_SIZE_LEN];
        size_buf.copy_from_slice(&data[SIZE_OFFSET..NONCE_OFFSET]);
        let original_size = u64::from_be_bytes(size_buf);

        let mut nonce = [0u8; HEADER_NONCE_SIZE];
        nonce.copy_from_slice(&data[NONCE_OFFSET..INTEGRITY_OFFSET]);

        let mut integrity_hash = [0u8; INTEGRITY_LEN];
        integrity_hash.copy_from_slice(&data[INTEGRITY_OFFSET..AUTH_OFFSET]);

        let mut auth_tag = [0u8; AUTH_LEN];
        auth_tag.copy_from_slice(&data[AUTH_OFFSET..CHECKSUM_OFFSET]);

        let header = Self {
            salt,
            original_size,
            nonce,
            integrity_hash,
            auth_tag,
        };

        if header.integrity_hash != header.compute_integrity_hash() {
            return Err(HexWardenError::Tampering);
        }
        Ok(header)
    }

    fn compute_integrity_hash(&self) -> [u8; INTEGRITY_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(MAGIC);
        hasher.update(self.salt);
        hasher.update(self.original_size.to_be_bytes());
        hasher.update(self.nonce);
        hasher.finalize().into()
    }

    fn compute_auth_tag(&self, key: &[u8]) -> [u8; AUTH_LEN] {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
        mac.update(MAGIC);
        mac.update(&self.salt);
        mac.update(&self.original_size.to_be_bytes());
        mac.update(&self.nonce);
        mac.update(&self.integrity_hash);
        mac.finalize().into_bytes().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::generate_salt;

    #[test]
    fn serialized_layout() {
        let salt = generate_salt().unwrap();
        let header = Header::new(&salt, 14, b"key material").unwrap();
        let buf = header.marshal();
        assert_eq!(&buf[..4], MAGIC);
        assert_eq!(&buf[36..44], &14u64.to_be_bytes());
        assert_eq!(buf.len(), HEADER_SIZE);
    }

    #[test]
    fn rejects_weak_salt_and_empty_key() {
        assert!(matches!(
            Header::new(&[0u8; SALT_SIZE], 1, b"key"),
            Err(HexWardenError::InvalidSalt)
        ));

        let salt = generate_salt().unwrap();
        assert!(Header::new(&salt, 1, b"").is_err());
    }
}
