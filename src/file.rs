//! File open/create helpers, output-path policy, and deletion.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use getrandom::fill as getrandom;

use crate::types::HexWardenError;

/// Extension appended to encrypted outputs.
pub const ENCRYPTED_EXT: &str = "hex";

/// Default number of overwrite passes for secure deletion.
pub const SECURE_DELETE_PASSES: u32 = 3;

const OVERWRITE_BUF_LEN: usize = 4096;

/// Open an existing file for reading, mapping a missing path to
/// [`HexWardenError::FileNotFound`].
pub fn open_source(path: &Path) -> Result<File, HexWardenError> {
    match File::open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(HexWardenError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Create a destination file, refusing to overwrite an existing one.
pub fn create_new(path: &Path) -> Result<File, HexWardenError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(HexWardenError::FileExists(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Default encryption output path: the input path with ".hex" appended
/// (existing extensions are preserved).
pub fn default_encrypt_output_path(input: &Path) -> PathBuf {
    let mut path = input.to_path_buf();
    if let Some(ext) = input.extension().and_then(|e| e.to_str()) {
        path.set_extension(format!("{ext}.{ENCRYPTED_EXT}"));
    } else {
        path.set_extension(ENCRYPTED_EXT);
    }
    path
}

/// Default decryption output path: strip a trailing ".hex", otherwise
/// append ".dec".
pub fn default_decrypt_output_path(input: &Path) -> PathBuf {
    let name = input.to_string_lossy();
    if let Some(stripped) = name.strip_suffix(&format!(".{ENCRYPTED_EXT}")) {
        PathBuf::from(stripped)
    } else {
        let mut path = input.to_path_buf();
        path.set_extension("dec");
        path
    }
}

/// Standard removal.
pub fn remove(path: &Path) -> Result<(), HexWardenError> {
    fs::remove_file(path).map_err(HexWardenError::from)
}

/// Overwrite the file with random data `passes` times, then remove it.
pub fn secure_delete(path: &Path, passes: u32) -> Result<(), HexWardenError> {
    let mut file = match OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(HexWardenError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let len = file.metadata()?.len();
    for _ in 0..passes.max(1) {
        random_overwrite(&mut file, len)?;
    }
    file.sync_all()?;
    drop(file);

    fs::remove_file(path).map_err(HexWardenError::from)
}

fn random_overwrite(file: &mut File, len: u64) -> Result<(), HexWardenError> {
    file.seek(SeekFrom::Start(0))?;

    let mut buf = [0u8; OVERWRITE_BUF_LEN];
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(OVERWRITE_BUF_LEN as u64) as usize;
        getrandom(&mut buf[..n]).map_err(|_| HexWardenError::Rng)?;
        file.write_all(&buf[..n])?;
        remaining -= n as u64;
    }
    file.flush()?;
    Ok(())
}
