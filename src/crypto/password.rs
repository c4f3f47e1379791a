//! Password-based key derivation.
//!
//! Two derivations are available. [`derive_key`] hashes the password once with
//! SHA-256 and uses the first 32 characters of the lowercase hex digest as the
//! AES-256 key bytes, matching the files the dit client has always written;
//! the same password always yields the same key. [`derive_key_argon2`] runs
//! Argon2id over the password and a per-record random salt and is the stronger
//! choice for new records.

use crate::error::{DitConfigError, Result};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// The length of the salt used for Argon2id derivation.
pub const SALT_LENGTH: usize = 32;

/// The length of the derived key.
pub const KEY_LENGTH: usize = 32;

/// Derive a 256-bit key from a password with a single unsalted SHA-256 pass.
///
/// The key is the ASCII text of the first 32 hex digits of the digest.
///
/// # Example
///
/// ```
/// use ditconfig::crypto::password::{derive_key, KEY_LENGTH};
///
/// let key = derive_key(b"correct horse");
/// assert_eq!(key.len(), KEY_LENGTH);
/// assert_eq!(key, derive_key(b"correct horse"));
/// ```
pub fn derive_key(password: &[u8]) -> [u8; KEY_LENGTH] {
    let digest_hex = Zeroizing::new(hex::encode(Sha256::digest(password)));
    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&digest_hex.as_bytes()[..KEY_LENGTH]);
    key
}

/// Generate a random salt for Argon2id derivation.
///
/// Fails with `RandomSourceError` when the OS generator is unavailable.
pub fn generate_salt() -> Result<[u8; SALT_LENGTH]> {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| DitConfigError::RandomSourceError(e.to_string()))?;
    Ok(salt)
}

/// Derive a key from a password and salt using Argon2id with default parameters.
///
/// # Example
///
/// ```
/// use ditconfig::crypto::password::{derive_key_argon2, generate_salt, KEY_LENGTH};
///
/// let salt = generate_salt().unwrap();
/// let key = derive_key_argon2(b"secure-password", &salt).unwrap();
/// assert_eq!(key.len(), KEY_LENGTH);
/// ```
pub fn derive_key_argon2(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_LENGTH]> {
    if salt.len() != SALT_LENGTH {
        return Err(DitConfigError::KeyDerivationError(format!(
            "Salt must be {} bytes, got {}",
            SALT_LENGTH,
            salt.len()
        )));
    }

    let mut output = [0u8; KEY_LENGTH];
    Argon2::default()
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| DitConfigError::KeyDerivationError(format!("Argon2 error: {}", e)))?;

    Ok(output)
}

/// How the symmetric key of a record is derived from its password.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Kdf {
    /// Unsalted SHA-256 of the password, see [`derive_key`].
    #[default]
    Sha256,
    /// Argon2id over the password and a per-record salt.
    Argon2id { salt: [u8; SALT_LENGTH] },
}

impl Kdf {
    /// Argon2id with a freshly generated salt.
    pub fn argon2id() -> Result<Self> {
        Ok(Kdf::Argon2id {
            salt: generate_salt()?,
        })
    }

    /// Derive the 256-bit key for `password`.
    pub fn derive(&self, password: &[u8]) -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
        let key = match self {
            Kdf::Sha256 => derive_key(password),
            Kdf::Argon2id { salt } => derive_key_argon2(password, salt)?,
        };
        Ok(Zeroizing::new(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_is_hex_digest_prefix() {
        // SHA-256("abc") = ba7816bf8f01cfea414140de5dae2223b00361a3...
        assert_eq!(&derive_key(b"abc"), b"ba7816bf8f01cfea414140de5dae2223");
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        assert_eq!(derive_key(b"pw"), derive_key(b"pw"));
    }

    #[test]
    fn test_derive_key_different_passwords() {
        assert_ne!(derive_key(b"password1"), derive_key(b"password2"));
    }

    #[test]
    fn test_generate_salt_produces_different_values() {
        let salt1 = generate_salt().unwrap();
        let salt2 = generate_salt().unwrap();
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_derive_key_argon2_same_password_same_salt() {
        let salt = generate_salt().unwrap();

        let key1 = derive_key_argon2(b"test-password", &salt).unwrap();
        let key2 = derive_key_argon2(b"test-password", &salt).unwrap();

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_derive_key_argon2_different_salts() {
        let salt1 = generate_salt().unwrap();
        let salt2 = generate_salt().unwrap();

        let key1 = derive_key_argon2(b"test-password", &salt1).unwrap();
        let key2 = derive_key_argon2(b"test-password", &salt2).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_derive_key_argon2_differs_from_sha256() {
        let salt = generate_salt().unwrap();
        let key = derive_key_argon2(b"test-password", &salt).unwrap();
        assert_ne!(key, derive_key(b"test-password"));
    }

    #[test]
    fn test_kdf_sha256_matches_derive_key() {
        let key = Kdf::Sha256.derive(b"pw").unwrap();
        assert_eq!(*key, derive_key(b"pw"));
    }

    #[test]
    fn test_kdf_argon2id_uses_its_salt() {
        let kdf = Kdf::argon2id().unwrap();
        let Kdf::Argon2id { salt } = &kdf else {
            panic!("Expected Argon2id");
        };

        let key = kdf.derive(b"pw").unwrap();
        assert_eq!(*key, derive_key_argon2(b"pw", salt).unwrap());
    }

    #[test]
    fn test_derive_key_argon2_invalid_salt_length() {
        let result = derive_key_argon2(b"test-password", &[0u8; 16]);

        match result {
            Err(DitConfigError::KeyDerivationError(msg)) => {
                assert!(msg.contains("Salt must be"));
            }
            _ => panic!("Expected KeyDerivationError"),
        }
    }
}
