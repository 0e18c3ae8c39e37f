#![forbid(unsafe_code)]
//! # hexwarden — password-based authenticated file encryption with
//! forward error correction.
//!
//! `hexwarden` transforms an arbitrary file into a self-contained,
//! authenticated, erasure-coded ciphertext file and inverts that
//! transformation deterministically.
//!
//! ## Pipeline
//! Each chunk is gzip-compressed, PKCS#7-padded, sealed with AES-256-GCM
//! under a fresh nonce, and Reed-Solomon encoded (4 data + 10 parity
//! shards). Chunks are processed by a parallel worker pool and written in
//! strict index order. The 128-byte file header binds a random Argon2id
//! salt, the plaintext length, and a reserved nonce under SHA-256, an
//! HMAC-SHA256 tag keyed by the derived key, and a CRC32 checksum.
//!
//! ## Example: encrypt and decrypt a file
//! ```no_run
//! use hexwarden::{decrypt_file, encrypt_file};
//! use secrecy::SecretString;
//! use std::path::Path;
//!
//! let password = SecretString::new("correct horse".into());
//! encrypt_file(Path::new("plan.txt"), Path::new("plan.txt.hex"), &password, |_| {}).unwrap();
//! decrypt_file(Path::new("plan.txt.hex"), Path::new("plan.txt.out"), &password, |_| {}).unwrap();
//! ```
//!
//! Safety notes
//! - Protects data at rest. Does not defend against compromised hosts or
//!   side channels.

pub mod compress;
pub mod crypto;
pub mod erasure;
pub mod file;
pub mod header;
pub mod kdf;
pub mod padding;
pub mod pipeline;
pub mod reorder;
pub mod stream;
pub mod types;

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use secrecy::SecretString;

pub use file::{default_decrypt_output_path, default_encrypt_output_path, secure_delete};
pub use header::{Header, HEADER_SIZE, MAGIC};
pub use stream::{CancelHandle, StreamConfig, StreamProcessor};
pub use types::{
    Direction, HexWardenError, KdfParams, DEFAULT_CHUNK_SIZE, DEFAULT_QUEUE_SIZE, KEY_SIZE,
    SALT_SIZE,
};

/// Encrypt a byte slice into a self-contained ciphertext buffer.
///
/// The output carries the same layout as an encrypted file: the 128-byte
/// header followed by length-prefixed chunk records.
pub fn encrypt_bytes(
    plaintext: &[u8],
    password: &SecretString,
) -> Result<Vec<u8>, HexWardenError> {
    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(password, &salt)?;
    let header = Header::new(&salt, plaintext.len() as u64, key.as_slice())?;

    let mut out = Vec::new();
    header.write_to(&mut out)?;

    let processor = StreamProcessor::new(key.as_slice(), StreamConfig::new(Direction::Encrypt))?;
    processor.process(plaintext, &mut out, |_| {})?;
    Ok(out)
}

/// Decrypt a buffer produced by [`encrypt_bytes`] (or a slurped encrypted
/// file). Verifies the header tag before touching any chunk.
pub fn decrypt_bytes(input: &[u8], password: &SecretString) -> Result<Vec<u8>, HexWardenError> {
    let mut reader = input;
    let header = Header::read_from(&mut reader)?;

    let key = kdf::derive_key(password, &header.salt())?;
    header.verify_key(key.as_slice())?;

    let mut out = Vec::with_capacity(header.original_size().min(1 << 20) as usize);
    let processor = StreamProcessor::new(key.as_slice(), StreamConfig::new(Direction::Decrypt))?;
    processor.process(reader, &mut out, |_| {})?;
    Ok(out)
}

/// Encrypt `input` into `output` with a password-derived key.
///
/// A fresh salt is generated per file, the 128-byte header is written
/// first, and the chunk stream follows. The destination must not already
/// exist; on any failure a partially written destination is removed.
/// `progress` receives the plaintext byte count of each committed chunk.
pub fn encrypt_file<F: FnMut(u64)>(
    input: &Path,
    output: &Path,
    password: &SecretString,
    progress: F,
) -> Result<(), HexWardenError> {
    encrypt_file_with_config(input, output, password, StreamConfig::new(Direction::Encrypt), progress)
}

/// [`encrypt_file`] with explicit stream tuning (concurrency, queue size,
/// chunk size). The direction field is forced to encrypt.
pub fn encrypt_file_with_config<F: FnMut(u64)>(
    input: &Path,
    output: &Path,
    password: &SecretString,
    mut config: StreamConfig,
    progress: F,
) -> Result<(), HexWardenError> {
    config.direction = Direction::Encrypt;

    let source = file::open_source(input)?;
    let original_size = source.metadata()?.len();

    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(password, &salt)?;
    let header = Header::new(&salt, original_size, key.as_slice())?;

    let dest = file::create_new(output)?;
    let result = (|| {
        let mut writer = BufWriter::new(&dest);
        header.write_to(&mut writer)?;

        let processor = StreamProcessor::new(key.as_slice(), config)?;
        processor.process(BufReader::new(source), &mut writer, progress)?;

        writer.flush()?;
        dest.sync_all()?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result
}

/// Decrypt `input` into `output`.
///
/// The header is read and validated, the key is derived from the password
/// and the stored salt, and the header authentication tag is verified
/// before any chunk is read. A wrong password and a tampered tag are
/// indistinguishable by design. On any failure a partially written
/// destination is removed.
pub fn decrypt_file<F: FnMut(u64)>(
    input: &Path,
    output: &Path,
    password: &SecretString,
    progress: F,
) -> Result<(), HexWardenError> {
    decrypt_file_with_config(input, output, password, StreamConfig::new(Direction::Decrypt), progress)
}

/// [`decrypt_file`] with explicit stream tuning. The direction field is
/// forced to decrypt.
pub fn decrypt_file_with_config<F: FnMut(u64)>(
    input: &Path,
    output: &Path,
    password: &SecretString,
    mut config: StreamConfig,
    progress: F,
) -> Result<(), HexWardenError> {
    config.direction = Direction::Decrypt;

    let source = file::open_source(input)?;
    if source.metadata()?.len() == 0 {
        return Err(HexWardenError::FileEmpty(input.to_path_buf()));
    }

    let mut reader = BufReader::new(source);
    let header = Header::read_from(&mut reader)?;

    let key = kdf::derive_key(password, &header.salt())?;
    header.verify_key(key.as_slice())?;

    if header.original_size() > i64::MAX as u64 {
        return Err(HexWardenError::Invalid("recorded size exceeds supported maximum"));
    }

    let dest = file::create_new(output)?;
    let result = (|| {
        let mut writer = BufWriter::new(&dest);

        let processor = StreamProcessor::new(key.as_slice(), config)?;
        processor.process(reader, &mut writer, progress)?;

        writer.flush()?;
        dest.sync_all()?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result
}
