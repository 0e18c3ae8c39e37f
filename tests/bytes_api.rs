//! In-memory encrypt/decrypt API over the on-disk format.

use hexwarden::{decrypt_bytes, encrypt_bytes, HexWardenError, HEADER_SIZE, MAGIC};
use secrecy::SecretString;

fn blob(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u32).wrapping_mul(1664525).wrapping_add(1013904223) as u8)
        .collect()
}

#[test]
fn round_trip_various_sizes() {
    let pw = SecretString::new("pw".into());
    for len in [0usize, 1, 1023, 64 * 1024, 2 * 1024 * 1024 + 13] {
        let data = blob(len);
        let ct = encrypt_bytes(&data, &pw).unwrap();
        assert_eq!(decrypt_bytes(&ct, &pw).unwrap(), data, "len={len}");
    }
}

#[test]
fn output_is_a_valid_warden_file_image() {
    let pw = SecretString::new("pw".into());
    let ct = encrypt_bytes(b"payload", &pw).unwrap();
    assert_eq!(&ct[..4], MAGIC);
    assert_eq!(&ct[36..44], &7u64.to_be_bytes());
    assert!(ct.len() > HEADER_SIZE);
}

#[test]
fn empty_plaintext_is_header_only() {
    let pw = SecretString::new("pw".into());
    let ct = encrypt_bytes(b"", &pw).unwrap();
    assert_eq!(ct.len(), HEADER_SIZE);
    assert!(decrypt_bytes(&ct, &pw).unwrap().is_empty());
}

#[test]
fn wrong_password_is_auth_failure() {
    let ct = encrypt_bytes(b"secret", &SecretString::new("a".into())).unwrap();
    let err = decrypt_bytes(&ct, &SecretString::new("b".into())).unwrap_err();
    assert!(matches!(err, HexWardenError::AuthFailure));
}

#[test]
fn truncated_buffer_is_incomplete_read() {
    let pw = SecretString::new("pw".into());
    let ct = encrypt_bytes(b"some data worth keeping", &pw).unwrap();
    let err = decrypt_bytes(&ct[..HEADER_SIZE - 10], &pw).unwrap_err();
    assert!(matches!(err, HexWardenError::IncompleteRead));

    let err = decrypt_bytes(&ct[..ct.len() - 3], &pw).unwrap_err();
    assert!(matches!(err, HexWardenError::IncompleteRead));
}

#[test]
fn file_and_bytes_formats_interoperate() {
    let dir = tempfile::tempdir().unwrap();
    let pw = SecretString::new("pw".into());
    let data = blob(128 * 1024);

    // Bytes-encrypted buffer decrypts through the file path.
    let ct = encrypt_bytes(&data, &pw).unwrap();
    let enc = dir.path().join("from_bytes.hex");
    let back = dir.path().join("back.bin");
    std::fs::write(&enc, &ct).unwrap();
    hexwarden::decrypt_file(&enc, &back, &pw, |_| {}).unwrap();
    assert_eq!(std::fs::read(&back).unwrap(), data);

    // File-encrypted output decrypts through the bytes path.
    let input = dir.path().join("in.bin");
    let enc2 = dir.path().join("from_file.hex");
    std::fs::write(&input, &data).unwrap();
    hexwarden::encrypt_file(&input, &enc2, &pw, |_| {}).unwrap();
    assert_eq!(
        decrypt_bytes(&std::fs::read(&enc2).unwrap(), &pw).unwrap(),
        data
    );
}
