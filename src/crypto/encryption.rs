//! Private key encryption and decryption using AES-256-GCM.
//!
//! The encrypted output format is:
//! [nonce (12 bytes)][ciphertext (variable)][tag (16 bytes)]
//!
//! A fresh random nonce is drawn for every call, so encrypting the same
//! plaintext twice under the same password yields different bytes.

use crate::crypto::password::{derive_key, Kdf};
use crate::error::{DitConfigError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// The length of the nonce used for AES-GCM encryption.
pub const NONCE_LENGTH: usize = 12;

/// The length of the AES-GCM authentication tag.
pub const TAG_LENGTH: usize = 16;

/// Encrypt `plaintext` under a key derived from `password` with [`derive_key`].
///
/// # Example
///
/// ```
/// use ditconfig::crypto::encryption::{decrypt, encrypt};
///
/// let key = b"4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
/// let encrypted = encrypt(key, b"secure-password").unwrap();
/// let decrypted = decrypt(&encrypted, b"secure-password").unwrap();
///
/// assert_eq!(key.as_slice(), decrypted.as_slice());
/// ```
pub fn encrypt(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let key = Zeroizing::new(derive_key(password));
    encrypt_with_key(plaintext, key.as_slice())
}

/// Decrypt a blob produced by [`encrypt`].
///
/// A wrong password and a tampered blob both fail with `AuthenticationError`.
pub fn decrypt(blob: &[u8], password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let key = Zeroizing::new(derive_key(password));
    decrypt_with_key(blob, key.as_slice())
}

/// Encrypt with a key derived by `kdf`.
pub fn encrypt_private_key(plaintext: &[u8], password: &[u8], kdf: &Kdf) -> Result<Vec<u8>> {
    let key = kdf.derive(password)?;
    encrypt_with_key(plaintext, key.as_slice())
}

/// Decrypt with a key derived by `kdf`.
pub fn decrypt_private_key(blob: &[u8], password: &[u8], kdf: &Kdf) -> Result<Zeroizing<Vec<u8>>> {
    let key = kdf.derive(password)?;
    decrypt_with_key(blob, key.as_slice())
}

/// Encrypt with an already derived 32-byte key.
pub fn encrypt_with_key(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| DitConfigError::CipherInitError(format!("Invalid key length: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| DitConfigError::RandomSourceError(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| DitConfigError::CipherInitError(format!("Encryption failed: {}", e)))?;

    let mut output = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Decrypt with an already derived 32-byte key.
pub fn decrypt_with_key(blob: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if blob.len() < NONCE_LENGTH {
        return Err(DitConfigError::MalformedInputError(format!(
            "Encrypted data too short: expected at least {} bytes, got {}",
            NONCE_LENGTH,
            blob.len()
        )));
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LENGTH);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| DitConfigError::CipherInitError(format!("Invalid key length: {}", e)))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| DitConfigError::AuthenticationError)?;

    Ok(Zeroizing::new(plaintext))
}
