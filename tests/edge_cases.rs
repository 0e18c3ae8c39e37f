//! Awkward inputs: odd sizes, pathological content, and files that are not
//! ours.

use std::fs;
use std::io::Read;
use std::path::Path;

use hexwarden::{
    decrypt_file, decrypt_file_with_config, encrypt_file, encrypt_file_with_config, Direction,
    HexWardenError, StreamConfig, DEFAULT_CHUNK_SIZE, HEADER_SIZE,
};
use secrecy::SecretString;
use tempfile::tempdir;

fn slurp(path: &Path) -> Vec<u8> {
    let mut out = Vec::new();
    fs::File::open(path).unwrap().read_to_end(&mut out).unwrap();
    out
}

fn round_trip(data: &[u8]) -> Vec<u8> {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let enc = dir.path().join("out.hex");
    let back = dir.path().join("back.bin");
    fs::write(&input, data).unwrap();
    let pw = SecretString::new("pw".into());

    let mut enc_cfg = StreamConfig::new(Direction::Encrypt);
    enc_cfg.chunk_size = 32 * 1024;
    encrypt_file_with_config(&input, &enc, &pw, enc_cfg, |_| {}).unwrap();
    decrypt_file_with_config(&enc, &back, &pw, StreamConfig::new(Direction::Decrypt), |_| {})
        .unwrap();
    slurp(&back)
}

#[test]
fn single_byte_file() {
    assert_eq!(round_trip(b"!"), b"!");
}

#[test]
fn block_aligned_sizes() {
    for len in [16usize, 32, 256, 4096] {
        let data = vec![0x7fu8; len];
        assert_eq!(round_trip(&data), data, "len={len}");
    }
}

#[test]
fn all_zero_content() {
    let data = vec![0u8; 100 * 1024];
    assert_eq!(round_trip(&data), data);
}

#[test]
fn all_ones_content() {
    let data = vec![0xffu8; 77 * 1024 + 3];
    assert_eq!(round_trip(&data), data);
}

#[test]
fn high_entropy_content() {
    // Incompressible input makes gzip expand; the pipeline must not care.
    let data: Vec<u8> = (0..64 * 1024u32)
        .map(|i| {
            let x = i.wrapping_mul(0x9e3779b9).rotate_left(13) ^ 0xa5a5a5a5;
            (x >> ((i % 4) * 8)) as u8
        })
        .collect();
    assert_eq!(round_trip(&data), data);
}

#[test]
fn double_encryption_unwraps_cleanly() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let once = dir.path().join("once.hex");
    let twice = dir.path().join("twice.hex");
    let back_once = dir.path().join("back_once.hex");
    let back = dir.path().join("back.bin");
    fs::write(&input, b"wrap me twice").unwrap();
    let pw = SecretString::new("pw".into());

    encrypt_file(&input, &once, &pw, |_| {}).unwrap();
    encrypt_file(&once, &twice, &pw, |_| {}).unwrap();

    decrypt_file(&twice, &back_once, &pw, |_| {}).unwrap();
    assert_eq!(slurp(&back_once), slurp(&once));
    decrypt_file(&back_once, &back, &pw, |_| {}).unwrap();
    assert_eq!(slurp(&back), b"wrap me twice");
}

#[test]
fn foreign_file_is_rejected_as_invalid_magic() {
    let dir = tempdir().unwrap();
    let alien = dir.path().join("alien.hex");
    // Plausible length, wrong magic.
    fs::write(&alien, vec![0x50u8; HEADER_SIZE + 64]).unwrap();

    let err = decrypt_file(
        &alien,
        &dir.path().join("back.bin"),
        &SecretString::new("pw".into()),
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, HexWardenError::InvalidMagic));
}

#[test]
fn empty_ciphertext_file_is_rejected() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.hex");
    fs::write(&empty, b"").unwrap();

    let err = decrypt_file(
        &empty,
        &dir.path().join("back.bin"),
        &SecretString::new("pw".into()),
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, HexWardenError::FileEmpty(_)));
}

#[test]
fn sub_header_file_is_incomplete_read() {
    let dir = tempdir().unwrap();
    let stub = dir.path().join("stub.hex");
    fs::write(&stub, vec![0u8; HEADER_SIZE - 1]).unwrap();

    let err = decrypt_file(
        &stub,
        &dir.path().join("back.bin"),
        &SecretString::new("pw".into()),
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, HexWardenError::IncompleteRead));
}

#[test]
fn default_chunk_size_is_one_mib() {
    assert_eq!(DEFAULT_CHUNK_SIZE, 1 << 20);
}

#[test]
fn unicode_path_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("zámĕk-清单.txt");
    let enc = dir.path().join("zámĕk-清单.txt.hex");
    let back = dir.path().join("back.txt");
    fs::write(&input, "Zkouška šifrování\n".as_bytes()).unwrap();
    let pw = SecretString::new("heslo".into());

    encrypt_file(&input, &enc, &pw, |_| {}).unwrap();
    decrypt_file(&enc, &back, &pw, |_| {}).unwrap();
    assert_eq!(slurp(&back), "Zkouška šifrování\n".as_bytes());
}
