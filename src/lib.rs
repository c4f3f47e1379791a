//! ditconfig: password-protected account and configuration store for the dit client
//!
//! The dit client keeps one configuration record per user in `~/.ditconfig`.
//! The record holds the network identifiers the client talks to, the tracked
//! repositories with their in-flight votes, and the user's EVM account. The
//! account's private key is only ever stored encrypted with a password.
//!
//! # Architecture
//!
//! - [`crypto`] derives a symmetric key from the password and performs
//!   AES-256-GCM encryption of the private key.
//! - [`storage`] owns the record: it locates, validates, loads, creates and
//!   saves it, and unlocks the private key on demand.
//!
//! Key generation and password entry are supplied by the caller through the
//! [`storage::provider::KeypairProvider`] and
//! [`storage::provider::PasswordPrompt`] traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use ditconfig::error::Result;
//! use ditconfig::storage::store::ConfigStore;
//!
//! fn example() -> Result<()> {
//!     let store = ConfigStore::load_default()?;
//!     println!("Account: {}", store.record().address());
//!
//!     let private_key = store.unlock_private_key(b"my password")?;
//!     assert_eq!(private_key.len(), 64);
//!     Ok(())
//! }
//! ```

pub mod crypto;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use error::{DitConfigError, Result};
pub use storage::provider::{AccountSetup, KeypairProvider, PasswordPrompt, PasswordPurpose};
pub use storage::record::ConfigRecord;
pub use storage::store::{ConfigStore, CreateOptions, KdfChoice};
