//! Core types, shared constants, and the crate-wide error enum.

use std::path::PathBuf;

use thiserror::Error;

/// Default chunk size for streaming (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Default bounded-channel capacity between pipeline stages.
pub const DEFAULT_QUEUE_SIZE: usize = 100;

/// Derived key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// KDF salt length in bytes.
pub const SALT_SIZE: usize = 32;

/// Direction of a stream run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Argon2id tuning (mem_kib in KiB).
///
/// These values are part of the on-disk format contract: they are not stored
/// in the header, so decryption must derive with the same parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub t_cost: u32,
    pub mem_kib: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            t_cost: 3,
            mem_kib: 64 * 1024,
            parallelism: 4,
        }
    }
}

/// A unit of work produced by the reader stage.
#[derive(Debug)]
pub struct Task {
    pub data: Vec<u8>,
    pub index: u64,
}

/// A processed chunk ready for in-order emission.
///
/// `size` is the byte count reported to the progress callback: the input
/// plaintext length when encrypting, the output plaintext length when
/// decrypting.
#[derive(Debug)]
pub struct TaskResult {
    pub index: u64,
    pub data: Vec<u8>,
    pub size: usize,
}

/// Library error type (no panics for expected failures).
#[derive(Error, Debug)]
pub enum HexWardenError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("random generator failure")]
    Rng,
    #[error("AES key must be 16, 24, or 32 bytes")]
    InvalidKeySize,
    #[error("plaintext cannot be empty")]
    EmptyPlaintext,
    #[error("ciphertext cannot be empty")]
    EmptyCiphertext,
    #[error("encryption operation failed")]
    EncryptionFailed,
    #[error("decryption operation failed")]
    DecryptionFailed,
    #[error("compression operation failed")]
    CompressionFailed,
    #[error("decompression operation failed")]
    DecompressionFailed,
    #[error("padding operation failed")]
    PaddingFailed,
    #[error("unpadding operation failed")]
    UnpaddingFailed,
    #[error("encoding operation failed")]
    EncodingFailed,
    #[error("decoding operation failed")]
    DecodingFailed,
    #[error("password cannot be empty")]
    EmptyPassword,
    #[error("invalid salt")]
    InvalidSalt,
    #[error("invalid magic bytes")]
    InvalidMagic,
    #[error("header checksum verification failed")]
    ChecksumMismatch,
    #[error("header tampering detected")]
    Tampering,
    #[error("header integrity verification failed")]
    IntegrityFailure,
    #[error("header authentication failed")]
    AuthFailure,
    #[error("incomplete read")]
    IncompleteRead,
    #[error("incomplete write")]
    IncompleteWrite,
    #[error("chunk size exceeds maximum allowed")]
    ChunkTooLarge,
    #[error("operation was canceled")]
    Canceled,
    #[error("file already exists: {}", .0.display())]
    FileExists(PathBuf),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("file is empty: {}", .0.display())]
    FileEmpty(PathBuf),
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}
