//! Argon2id key derivation and salt policy.

use argon2::{Algorithm, Argon2, Params, Version};
use getrandom::fill as getrandom;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::types::{HexWardenError, KdfParams, KEY_SIZE, SALT_SIZE};

/// Derive a 32-byte key from the password and a 32-byte salt using Argon2id.
///
/// Parameters are fixed (see [`KdfParams`]); they are not recorded in the
/// file header, so both sides of a round trip must agree on them.
pub fn derive_key(
    password: &SecretString,
    salt: &[u8],
) -> Result<Zeroizing<[u8; KEY_SIZE]>, HexWardenError> {
    if password.expose_secret().is_empty() {
        return Err(HexWardenError::EmptyPassword);
    }
    if salt.len() != SALT_SIZE {
        return Err(HexWardenError::InvalidSalt);
    }

    let params = KdfParams::default();
    let argon_params = Params::new(
        params.mem_kib,
        params.t_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|_| HexWardenError::Invalid("invalid Argon2 params"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(password.expose_secret().as_bytes(), salt, &mut key[..])
        .map_err(|_| HexWardenError::Invalid("key derivation failed"))?;
    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_SIZE], HexWardenError> {
    let mut salt = [0u8; SALT_SIZE];
    getrandom(&mut salt).map_err(|_| HexWardenError::Rng)?;
    Ok(salt)
}

/// Check salt length and reject obviously non-random patterns.
pub fn validate_salt(salt: &[u8]) -> Result<(), HexWardenError> {
    if salt.len() != SALT_SIZE {
        return Err(HexWardenError::InvalidSalt);
    }
    if is_weak_salt(salt) {
        return Err(HexWardenError::InvalidSalt);
    }
    Ok(())
}

/// A salt is weak when every byte is zero or when its first four bytes
/// repeat across the whole span. A sanity check, not a randomness proof.
fn is_weak_salt(salt: &[u8]) -> bool {
    if salt.iter().all(|&b| b == 0) {
        return true;
    }
    let pattern = &salt[..4];
    salt.chunks(4).all(|chunk| chunk == pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_salt_detection() {
        assert!(is_weak_salt(&[0u8; SALT_SIZE]));

        let mut repeating = [0u8; SALT_SIZE];
        for chunk in repeating.chunks_mut(4) {
            chunk.copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        }
        assert!(is_weak_salt(&repeating));

        let mut ok = repeating;
        ok[SALT_SIZE - 1] ^= 1;
        assert!(!is_weak_salt(&ok));
    }

    #[test]
    fn generated_salts_validate() {
        let salt = generate_salt().unwrap();
        validate_salt(&salt).unwrap();
    }

    #[test]
    fn rejects_bad_inputs() {
        let salt = generate_salt().unwrap();
        let empty = SecretString::new("".into());
        assert!(matches!(
            derive_key(&empty, &salt),
            Err(HexWardenError::EmptyPassword)
        ));

        let pw = SecretString::new("pw".into());
        assert!(matches!(
            derive_key(&pw, &salt[..16]),
            Err(HexWardenError::InvalidSalt)
        ));
    }
}
