//! Secp256k1 keypairs for the EVM account held in the config record.
//!
//! Addresses are derived as keccak256(uncompressed_pubkey[1..])[12..] and
//! rendered with the EIP-55 mixed-case checksum.

use crate::error::{DitConfigError, Result};
use crate::storage::provider::{GeneratedKey, KeypairProvider};
use alloy_primitives::{keccak256, Address};
use k256::{elliptic_curve::sec1::ToEncodedPoint, SecretKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Length of a hex-encoded secp256k1 scalar without prefix.
pub const PRIVATE_KEY_HEX_LENGTH: usize = 64;

/// [`KeypairProvider`] backed by the k256 curve implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Provider;

impl KeypairProvider for Secp256k1Provider {
    fn generate(&self) -> Result<GeneratedKey> {
        let secret = SecretKey::random(&mut OsRng);
        Ok(to_generated_key(&secret))
    }

    fn import(&self, private_key_hex: &str) -> Result<GeneratedKey> {
        let secret = parse_secret_key(private_key_hex)?;
        Ok(to_generated_key(&secret))
    }
}

/// Parse a hex-encoded secret scalar, with or without a `0x` prefix.
///
/// # Example
///
/// ```
/// use ditconfig::crypto::secp256k1::parse_secret_key;
///
/// let hex = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
/// assert!(parse_secret_key(hex).is_ok());
/// assert!(parse_secret_key(&format!("0x{}", hex)).is_ok());
/// assert!(parse_secret_key("abcd").is_err());
/// ```
pub fn parse_secret_key(private_key_hex: &str) -> Result<SecretKey> {
    let trimmed = private_key_hex.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != PRIVATE_KEY_HEX_LENGTH {
        return Err(DitConfigError::KeyFormatError(format!(
            "Expected {} hex characters, got {}",
            PRIVATE_KEY_HEX_LENGTH,
            digits.len()
        )));
    }

    let bytes = Zeroizing::new(
        hex::decode(digits)
            .map_err(|e| DitConfigError::KeyFormatError(format!("Invalid hex string: {}", e)))?,
    );

    SecretKey::from_slice(&bytes)
        .map_err(|_| DitConfigError::KeyFormatError("Not a valid secp256k1 scalar".to_string()))
}

/// Derive the checksummed EVM address of a secret key.
pub fn evm_address(secret: &SecretKey) -> String {
    let encoded = secret.public_key().to_encoded_point(false);
    // Skip the 0x04 prefix byte
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..]).to_checksum(None)
}

fn to_generated_key(secret: &SecretKey) -> GeneratedKey {
    let scalar: Zeroizing<[u8; 32]> = Zeroizing::new(secret.to_bytes().into());
    GeneratedKey {
        address: evm_address(secret),
        private_key_hex: Zeroizing::new(hex::encode(scalar.as_slice())),
    }
}
