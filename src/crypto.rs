//! AES-GCM sealing and opening with a fresh nonce embedded per call.

use aead::generic_array::typenum::U12;
use aead::generic_array::GenericArray;
use aead::{Aead, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use getrandom::fill as getrandom;

use crate::types::HexWardenError;

/// AEAD nonce length (96 bits, the GCM standard size).
pub const NONCE_LEN: usize = 12;

/// AEAD authentication tag length.
pub const TAG_LEN: usize = 16;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// AES-GCM cipher keyed at construction.
///
/// The key selects the variant: 16 bytes for AES-128, 24 for AES-192,
/// 32 for AES-256. The stream engine always uses 32.
#[derive(Clone)]
pub enum AesCipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl AesCipher {
    pub fn new(key: &[u8]) -> Result<Self, HexWardenError> {
        match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .map(Self::Aes128)
                .map_err(|_| HexWardenError::InvalidKeySize),
            24 => Aes192Gcm::new_from_slice(key)
                .map(Self::Aes192)
                .map_err(|_| HexWardenError::InvalidKeySize),
            32 => Aes256Gcm::new_from_slice(key)
                .map(Self::Aes256)
                .map_err(|_| HexWardenError::InvalidKeySize),
            _ => Err(HexWardenError::InvalidKeySize),
        }
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    ///
    /// Returns `nonce || ciphertext || tag`; two calls on identical input
    /// produce distinct output.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        if plaintext.is_empty() {
            return Err(HexWardenError::EmptyPlaintext);
        }

        let mut nonce = [0u8; NONCE_LEN];
        getrandom(&mut nonce).map_err(|_| HexWardenError::Rng)?;

        let sealed = self.seal(&nonce, plaintext)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Decrypt a `nonce || ciphertext || tag` buffer produced by [`encrypt`].
    ///
    /// [`encrypt`]: AesCipher::encrypt
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        if ciphertext.is_empty() {
            return Err(HexWardenError::EmptyCiphertext);
        }
        if ciphertext.len() < NONCE_LEN {
            return Err(HexWardenError::DecryptionFailed);
        }

        let (nonce, body) = ciphertext.split_at(NONCE_LEN);
        self.open(nonce, body)
    }

    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        let nonce = GenericArray::from_slice(nonce);
        match self {
            Self::Aes128(cipher) => cipher.encrypt(nonce, plaintext),
            Self::Aes192(cipher) => cipher.encrypt(nonce, plaintext),
            Self::Aes256(cipher) => cipher.encrypt(nonce, plaintext),
        }
        .map_err(|_| HexWardenError::EncryptionFailed)
    }

    fn open(&self, nonce: &[u8], body: &[u8]) -> Result<Vec<u8>, HexWardenError> {
        let nonce = GenericArray::from_slice(nonce);
        match self {
            Self::Aes128(cipher) => cipher.decrypt(nonce, body),
            Self::Aes192(cipher) => cipher.decrypt(nonce, body),
            Self::Aes256(cipher) => cipher.decrypt(nonce, body),
        }
        .map_err(|_| HexWardenError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_key_sizes() {
        for len in [0usize, 1, 15, 17, 31, 33, 64] {
            let key = vec![0x42u8; len];
            assert!(matches!(
                AesCipher::new(&key),
                Err(HexWardenError::InvalidKeySize)
            ));
        }
        for len in [16usize, 24, 32] {
            let key = vec![0x42u8; len];
            assert!(AesCipher::new(&key).is_ok());
        }
    }

    #[test]
    fn fresh_nonce_per_call() {
        let cipher = AesCipher::new(&[7u8; 32]).unwrap();
        let a = cipher.encrypt(b"same input").unwrap();
        let b = cipher.encrypt(b"same input").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).unwrap(), b"same input");
        assert_eq!(cipher.decrypt(&b).unwrap(), b"same input");
    }

    #[test]
    fn empty_inputs_rejected() {
        let cipher = AesCipher::new(&[7u8; 32]).unwrap();
        assert!(matches!(
            cipher.encrypt(b""),
            Err(HexWardenError::EmptyPlaintext)
        ));
        assert!(matches!(
            cipher.decrypt(b""),
            Err(HexWardenError::EmptyCiphertext)
        ));
    }

    #[test]
    fn short_ciphertext_fails() {
        let cipher = AesCipher::new(&[7u8; 32]).unwrap();
        assert!(matches!(
            cipher.decrypt(&[0u8; NONCE_LEN - 1]),
            Err(HexWardenError::DecryptionFailed)
        ));
    }
}
