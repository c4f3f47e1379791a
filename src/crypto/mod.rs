//! Cryptographic operations module.
//!
//! This module provides the primitives behind the encrypted private key:
//!
//! - Password-based key derivation (SHA-256, or salted Argon2id)
//! - AES-256-GCM encryption with a random nonce per call
//! - Secp256k1 keypair generation and import for the EVM account
//!
//! # Example
//!
//! ```rust
//! use ditconfig::crypto::encryption::{decrypt, encrypt};
//!
//! # fn example() -> ditconfig::error::Result<()> {
//! let private_key = b"4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
//!
//! let encrypted = encrypt(private_key, b"secure-password")?;
//! let decrypted = decrypt(&encrypted, b"secure-password")?;
//! assert_eq!(private_key.as_slice(), decrypted.as_slice());
//! # Ok(())
//! # }
//! ```

pub mod encryption;
pub mod password;
pub mod secp256k1;
