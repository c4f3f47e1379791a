//! Error types for the ditconfig library.
//!
//! Every operation of the cipher and the config store reports failures through
//! [`DitConfigError`]. The variants are fine-grained enough for a caller to tell
//! "no config yet, run setup" apart from a generic I/O failure.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ditconfig operations.
#[derive(Error, Debug)]
pub enum DitConfigError {
    /// The config file does not exist yet
    #[error("Config file not found at {} - run 'setup' first", .0.display())]
    NotFoundError(PathBuf),

    /// Reading or writing the config file failed
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The config file is not well-formed JSON for a config record
    #[error("Failed to parse config file: {0}")]
    ParseError(#[source] serde_json::Error),

    /// The in-memory record could not be serialized
    #[error("Failed to serialize config record: {0}")]
    SerializeError(#[source] serde_json::Error),

    /// A structural or input check failed
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The stored encrypted key is not valid hex
    #[error("Failed to decode encrypted private key: {0}")]
    DecodeError(#[from] hex::FromHexError),

    /// A private key supplied for import or generation is unusable
    #[error("Invalid private key: {0}")]
    KeyFormatError(String),

    /// The AEAD cipher could not be constructed or refused to encrypt
    #[error("Cipher error: {0}")]
    CipherInitError(String),

    /// The operating system could not supply secure randomness
    #[error("Secure random source unavailable: {0}")]
    RandomSourceError(String),

    /// Authentication tag mismatch. Wrong password and tampered data are
    /// reported identically.
    #[error("Failed to decrypt private key - wrong password or corrupted data")]
    AuthenticationError,

    /// Encrypted input is too short to contain a nonce
    #[error("Malformed encrypted input: {0}")]
    MalformedInputError(String),

    /// Password-based key derivation failed
    #[error("Key derivation error: {0}")]
    KeyDerivationError(String),

    /// The user's home directory could not be determined
    #[error("Failed to determine the home directory of the current user")]
    ConfigDirError,
}

/// A specialized Result type for ditconfig operations.
pub type Result<T> = std::result::Result<T, DitConfigError>;
