//! Collaborator interfaces consumed by the config store.
//!
//! Key generation and password entry live outside the store. The store only
//! sees these two traits, so it can be driven by the terminal in the binary
//! and by scripted fakes in tests.

use crate::error::Result;
use zeroize::Zeroizing;

/// An account identity handed over by a [`KeypairProvider`].
#[derive(Clone)]
pub struct GeneratedKey {
    /// `0x`-prefixed, 42-character account address.
    pub address: String,

    /// Hex-encoded private key.
    pub private_key_hex: Zeroizing<String>,
}

impl std::fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("address", &self.address)
            .field("private_key_hex", &"[REDACTED]")
            .finish()
    }
}

/// Source of elliptic-curve keypairs.
pub trait KeypairProvider {
    /// Sample a fresh keypair.
    fn generate(&self) -> Result<GeneratedKey>;

    /// Derive the address for an existing hex-encoded private key.
    fn import(&self, private_key_hex: &str) -> Result<GeneratedKey>;
}

/// Why a password is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPurpose {
    /// First entry of a new password during setup.
    New,
    /// Repeated entry of the new password.
    Confirm,
    /// Password needed to unlock the stored key.
    Unlock,
}

/// Source of passwords, typically a hidden terminal prompt.
pub trait PasswordPrompt {
    fn read_password(&mut self, purpose: PasswordPurpose) -> Result<Zeroizing<Vec<u8>>>;
}

/// How the account of a new record is obtained.
#[derive(Clone)]
pub enum AccountSetup {
    /// Use the shared demo account.
    Demo,
    /// Ask the provider for a fresh keypair.
    Generate,
    /// Import the given hex-encoded private key through the provider.
    Import(Zeroizing<String>),
}

impl AccountSetup {
    pub fn is_demo(&self) -> bool {
        matches!(self, AccountSetup::Demo)
    }
}

impl std::fmt::Debug for AccountSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountSetup::Demo => f.write_str("Demo"),
            AccountSetup::Generate => f.write_str("Generate"),
            AccountSetup::Import(_) => f.write_str("Import([REDACTED])"),
        }
    }
}
